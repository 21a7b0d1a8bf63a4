use crate::model::{NamedParam, ParamTree};
use anyhow::Result;
use serde_json::Value;

/// A transform applied to every leaf of a parameter tree.
///
/// `apply` receives the key (map key or record field name) and the leaf's
/// string form, and returns `Some(new_value)` only when the leaf should
/// change. Returning `None` leaves the original value untouched, including
/// its original JSON type.
#[async_trait::async_trait]
pub trait LeafTransform: Send {
    async fn apply(&mut self, key: &str, value: &str) -> Result<Option<String>>;
}

/// Applies `transform` across a parameter tree without touching structure:
/// the key set, key order and record order are exactly what they were.
/// Returns whether anything changed.
pub async fn walk_tree(tree: &mut ParamTree, transform: &mut dyn LeafTransform) -> Result<bool> {
    match tree {
        ParamTree::Map(map) => {
            let mut changed = false;
            for (key, value) in map.iter_mut() {
                let leaf = stringify_leaf(value);
                if let Some(new_value) = transform.apply(key, &leaf).await? {
                    *value = Value::String(new_value);
                    changed = true;
                }
            }
            Ok(changed)
        }
        ParamTree::List(records) => {
            // A single record carries no sibling to disambiguate against and
            // is left untouched.
            if records.len() < 2 {
                return Ok(false);
            }
            let mut changed = false;
            for record in records.iter_mut() {
                changed |= walk_record(record, transform).await?;
            }
            Ok(changed)
        }
    }
}

async fn walk_record(record: &mut NamedParam, transform: &mut dyn LeafTransform) -> Result<bool> {
    let mut changed = false;
    if let Some(new_name) = transform.apply("name", &record.name).await? {
        record.name = new_name;
        changed = true;
    }
    if let Some(new_value) = transform.apply("value", &record.value).await? {
        record.value = new_value;
        changed = true;
    }
    if let Some(desc) = &record.desc {
        if let Some(new_desc) = transform.apply("desc", desc).await? {
            record.desc = Some(new_desc);
            changed = true;
        }
    }
    Ok(changed)
}

/// Runs the transform over a JSON-encoded body object. Bodies that do not
/// parse as an object carry no keyed values to rewrite and are skipped
/// entirely. Returns the re-encoded body only when something changed.
pub async fn walk_body_object(
    raw: &str,
    transform: &mut dyn LeafTransform,
) -> Result<Option<String>> {
    let map = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => return Ok(None),
    };
    let mut tree = ParamTree::Map(map);
    if !walk_tree(&mut tree, transform).await? {
        return Ok(None);
    }
    match tree {
        ParamTree::Map(map) => Ok(Some(serde_json::to_string(&Value::Object(map))?)),
        ParamTree::List(_) => Ok(None),
    }
}

fn stringify_leaf(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upcase;

    #[async_trait::async_trait]
    impl LeafTransform for Upcase {
        async fn apply(&mut self, _key: &str, value: &str) -> Result<Option<String>> {
            if value.starts_with("ref:") {
                Ok(Some(value.to_uppercase()))
            } else {
                Ok(None)
            }
        }
    }

    struct Noop;

    #[async_trait::async_trait]
    impl LeafTransform for Noop {
        async fn apply(&mut self, _key: &str, _value: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn map_walk_preserves_key_order_and_untouched_values() {
        let map = json!({"z": "ref:a", "a": 42, "m": true})
            .as_object()
            .cloned()
            .unwrap();
        let mut tree = ParamTree::Map(map);
        let changed = walk_tree(&mut tree, &mut Upcase).await.unwrap();
        assert!(changed);

        let ParamTree::Map(map) = tree else {
            panic!("walker must not change the tree shape");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(map["z"], json!("REF:A"));
        // untouched leaves keep their original JSON type
        assert_eq!(map["a"], json!(42));
        assert_eq!(map["m"], json!(true));
    }

    #[tokio::test]
    async fn single_item_list_is_left_untouched() {
        let mut tree = ParamTree::List(vec![NamedParam::new("token", "ref:a")]);
        let changed = walk_tree(&mut tree, &mut Upcase).await.unwrap();
        assert!(!changed);
        let ParamTree::List(records) = tree else {
            panic!("walker must not change the tree shape");
        };
        assert_eq!(records[0].value, "ref:a");
    }

    #[tokio::test]
    async fn list_walk_keeps_record_order() {
        let mut tree = ParamTree::List(vec![
            NamedParam::new("first", "ref:a"),
            NamedParam::new("second", "plain"),
            NamedParam::new("first", "other"),
        ]);
        let changed = walk_tree(&mut tree, &mut Upcase).await.unwrap();
        assert!(changed);
        let ParamTree::List(records) = tree else {
            panic!("walker must not change the tree shape");
        };
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "first"]);
        assert_eq!(records[0].value, "REF:A");
        assert_eq!(records[1].value, "plain");
    }

    #[tokio::test]
    async fn non_object_bodies_are_skipped() {
        assert_eq!(walk_body_object("[1, 2]", &mut Upcase).await.unwrap(), None);
        assert_eq!(
            walk_body_object("not json", &mut Upcase).await.unwrap(),
            None
        );
        assert_eq!(
            walk_body_object("\"ref:a\"", &mut Upcase).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn unchanged_body_yields_no_rewrite() {
        let raw = r#"{"a":"x","b":1}"#;
        assert_eq!(walk_body_object(raw, &mut Noop).await.unwrap(), None);
    }

    #[tokio::test]
    async fn changed_body_preserves_key_order() {
        let raw = r#"{"z":"ref:a","a":"keep"}"#;
        let rewritten = walk_body_object(raw, &mut Upcase).await.unwrap().unwrap();
        assert_eq!(rewritten, r#"{"z":"REF:A","a":"keep"}"#);
    }
}
