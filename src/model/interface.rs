use crate::model::{BodyType, Id, NamedParam};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An API endpoint definition. Cases instantiate interfaces; from this core's
/// perspective interfaces are read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub id: Id,
    pub project_id: Id,
    pub title: String,
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub req_query: Vec<NamedParam>,
    #[serde(default)]
    pub req_headers: Vec<NamedParam>,
    #[serde(default)]
    pub req_params: Vec<NamedParam>,
    #[serde(default)]
    pub req_body_form: Vec<NamedParam>,
    #[serde(default)]
    pub req_body_type: BodyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_body_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_body_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of an interface used to seed a freshly imported case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceBaseInfo {
    pub id: Id,
    pub title: String,
    pub req_body_type: BodyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_body_other: Option<String>,
}

impl Interface {
    pub fn base_info(&self) -> InterfaceBaseInfo {
        InterfaceBaseInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            req_body_type: self.req_body_type,
            req_body_other: self.req_body_other.clone(),
        }
    }
}
