/// Cross-case reference embedded in case parameter values.
///
/// Syntax is `$.<caseId><suffix>`: the id token runs from the `$.` prefix to
/// the first `.` (or end of input), everything after that first `.` is the
/// suffix and is preserved byte-for-byte across rewriting. A value whose id
/// token is empty (e.g. exactly `"$."`) is a plain literal, not a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRef {
    pub source_case_id: String,
    pub suffix: String,
}

impl CaseRef {
    pub fn parse(value: &str) -> Option<CaseRef> {
        let rest = value.strip_prefix("$.")?;
        let id_end = rest.find('.').unwrap_or(rest.len());
        if id_end == 0 {
            // empty id token, nothing to resolve
            return None;
        }
        Some(CaseRef {
            source_case_id: rest[..id_end].to_string(),
            suffix: rest[id_end..].to_string(),
        })
    }

    pub fn format(case_id: &str, suffix: &str) -> String {
        format!("$.{}{}", case_id, suffix)
    }

    /// The same reference re-pointed at another case.
    pub fn with_source(&self, case_id: &str) -> String {
        Self::format(case_id, &self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_with_path_suffix() {
        let r = CaseRef::parse("$.case-1.data.token").unwrap();
        assert_eq!(r.source_case_id, "case-1");
        assert_eq!(r.suffix, ".data.token");
    }

    #[test]
    fn parses_reference_without_suffix() {
        let r = CaseRef::parse("$.case-1").unwrap();
        assert_eq!(r.source_case_id, "case-1");
        assert_eq!(r.suffix, "");
    }

    #[test]
    fn rejects_non_references() {
        assert_eq!(CaseRef::parse("plain value"), None);
        assert_eq!(CaseRef::parse("prefix $.case-1"), None);
        assert_eq!(CaseRef::parse(""), None);
        assert_eq!(CaseRef::parse("$"), None);
    }

    #[test]
    fn empty_id_token_is_a_literal() {
        assert_eq!(CaseRef::parse("$."), None);
        assert_eq!(CaseRef::parse("$..data"), None);
    }

    #[test]
    fn format_parse_round_trip() {
        for (id, suffix) in [("abc", ".data.token"), ("x1", ""), ("id-9", ".a")] {
            let formatted = CaseRef::format(id, suffix);
            let parsed = CaseRef::parse(&formatted).unwrap();
            assert_eq!(parsed.source_case_id, id);
            assert_eq!(parsed.suffix, suffix);
        }
    }

    #[test]
    fn rewriting_preserves_suffix_bytes() {
        let r = CaseRef::parse("$.old.data..weird.").unwrap();
        assert_eq!(r.with_source("new"), "$.new.data..weird.");
    }
}
