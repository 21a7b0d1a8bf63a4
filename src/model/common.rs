use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

/// How a request body is encoded on the interface / case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Form,
    #[default]
    Json,
    Raw,
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
