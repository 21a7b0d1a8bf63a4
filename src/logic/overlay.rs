use crate::model::NamedParam;
use std::collections::HashMap;

/// Merges case-level parameter rows onto the interface's schema rows.
///
/// The schema defines the row set and order; the overlay contributes `value`
/// (and `enable` when set) for rows it names. Either side empty returns the
/// schema unchanged; an overlay name with several rows resolves to the last
/// one.
pub fn merge_param_overlay(schema: &[NamedParam], overlay: &[NamedParam]) -> Vec<NamedParam> {
    if schema.is_empty() || overlay.is_empty() {
        return schema.to_vec();
    }

    let mut by_name: HashMap<&str, &NamedParam> = HashMap::new();
    for row in overlay {
        by_name.insert(row.name.as_str(), row);
    }

    schema
        .iter()
        .map(|row| {
            let mut merged = row.clone();
            if let Some(over) = by_name.get(row.name.as_str()) {
                merged.value = over.value.clone();
                if over.enable.is_some() {
                    merged.enable = over.enable;
                }
            }
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, value: &str) -> NamedParam {
        NamedParam::new(name, value)
    }

    #[test]
    fn overlay_values_replace_schema_values_in_schema_order() {
        let schema = vec![row("token", ""), row("page", "1"), row("limit", "20")];
        let overlay = vec![row("limit", "50"), row("token", "abc")];
        let merged = merge_param_overlay(&schema, &overlay);
        let pairs: Vec<(&str, &str)> = merged
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("token", "abc"), ("page", "1"), ("limit", "50")]);
    }

    #[test]
    fn overlay_never_invents_rows() {
        let schema = vec![row("token", "")];
        let overlay = vec![row("token", "abc"), row("extra", "ignored")];
        let merged = merge_param_overlay(&schema, &overlay);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "token");
    }

    #[test]
    fn empty_sides_return_schema_unchanged() {
        let schema = vec![row("token", "default")];
        assert_eq!(merge_param_overlay(&schema, &[]), schema);
        assert_eq!(merge_param_overlay(&[], &schema), Vec::<NamedParam>::new());
    }

    #[test]
    fn enable_is_taken_only_when_the_overlay_sets_it() {
        let mut schema_row = row("token", "");
        schema_row.enable = Some(true);
        let mut overlay_row = row("token", "abc");
        overlay_row.enable = None;
        let merged = merge_param_overlay(&[schema_row.clone()], &[overlay_row.clone()]);
        assert_eq!(merged[0].enable, Some(true));

        overlay_row.enable = Some(false);
        let merged = merge_param_overlay(&[schema_row], &[overlay_row]);
        assert_eq!(merged[0].enable, Some(false));
    }

    #[test]
    fn duplicate_overlay_names_resolve_to_the_last_row() {
        let schema = vec![row("token", "")];
        let overlay = vec![row("token", "first"), row("token", "second")];
        let merged = merge_param_overlay(&schema, &overlay);
        assert_eq!(merged[0].value, "second");
    }
}
