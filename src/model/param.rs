use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One named request parameter row.
///
/// Case rows are overlays on the owning interface's schema rows, matched by
/// `name` rather than by position. Within a list the order is significant and
/// duplicate names are legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParam {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl NamedParam {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            enable: None,
            desc: None,
        }
    }
}

/// The two shapes case parameters take. The walker dispatches on this tag
/// instead of inspecting runtime types.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamTree {
    /// A parsed `req_body_other` object: key -> value.
    Map(Map<String, Value>),
    /// An ordered parameter list such as `req_query`.
    List(Vec<NamedParam>),
}
