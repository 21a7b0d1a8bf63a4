use crate::model::{BodyType, Id, NamedParam};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One parameterized instantiation of an interface inside exactly one
/// collection.
///
/// The `req_*` lists are overlays on the interface's schema: the schema
/// enumerates allowed names and order, the case only supplies values for the
/// names it overlays. `req_body_other` holds the JSON-encoded body for
/// non-form interfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: Id,
    pub interface_id: Id,
    pub col_id: Id,
    pub project_id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_env: Option<String>,
    /// Display/execution order within the collection. Not required unique.
    #[serde(default)]
    pub index: i64,
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
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Case input model for creation; id and audit fields are set server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCase {
    #[serde(default)]
    pub interface_id: Id,
    #[serde(default)]
    pub col_id: Id,
    #[serde(default)]
    pub project_id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_env: Option<String>,
    #[serde(default)]
    pub index: i64,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_body_other: Option<String>,
}

impl NewCase {
    /// Copies every field of `source` except identity (id, collection id,
    /// audit timestamps) for duplication into another collection.
    pub fn duplicate_of(source: &Case, dest_col_id: &Id) -> Self {
        Self {
            interface_id: source.interface_id.clone(),
            col_id: dest_col_id.clone(),
            project_id: source.project_id.clone(),
            name: source.name.clone(),
            case_env: source.case_env.clone(),
            index: source.index,
            req_query: source.req_query.clone(),
            req_headers: source.req_headers.clone(),
            req_params: source.req_params.clone(),
            req_body_form: source.req_body_form.clone(),
            req_body_type: source.req_body_type,
            req_body_other: source.req_body_other.clone(),
        }
    }
}

/// Partial update for a case. Interface and project bindings are immutable,
/// so they are simply not part of this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseUpdate {
    pub name: Option<String>,
    pub case_env: Option<String>,
    pub index: Option<i64>,
    pub req_query: Option<Vec<NamedParam>>,
    pub req_headers: Option<Vec<NamedParam>>,
    pub req_params: Option<Vec<NamedParam>>,
    pub req_body_form: Option<Vec<NamedParam>>,
    pub req_body_type: Option<BodyType>,
    pub req_body_other: Option<String>,
}

impl CaseUpdate {
    pub fn apply_to(self, case: &mut Case) {
        if let Some(name) = self.name {
            case.name = name;
        }
        if let Some(case_env) = self.case_env {
            case.case_env = Some(case_env);
        }
        if let Some(index) = self.index {
            case.index = index;
        }
        if let Some(req_query) = self.req_query {
            case.req_query = req_query;
        }
        if let Some(req_headers) = self.req_headers {
            case.req_headers = req_headers;
        }
        if let Some(req_params) = self.req_params {
            case.req_params = req_params;
        }
        if let Some(req_body_form) = self.req_body_form {
            case.req_body_form = req_body_form;
        }
        if let Some(req_body_type) = self.req_body_type {
            case.req_body_type = req_body_type;
        }
        if let Some(req_body_other) = self.req_body_other {
            case.req_body_other = Some(req_body_other);
        }
    }
}

/// A case joined with its interface definition, with every parameter overlay
/// merged onto the interface schema. This is the shape listings and single
/// lookups return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCase {
    pub id: Id,
    pub interface_id: Id,
    pub col_id: Id,
    pub project_id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_env: Option<String>,
    pub index: i64,
    pub path: String,
    pub method: String,
    pub req_query: Vec<NamedParam>,
    pub req_headers: Vec<NamedParam>,
    pub req_params: Vec<NamedParam>,
    pub req_body_form: Vec<NamedParam>,
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

/// Variable-oriented view of a case: the response body template plus a flat
/// name map of everything the case can substitute into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseVariables {
    pub id: Id,
    pub name: String,
    pub index: i64,
    /// Parsed response body template; `{}` when the interface has none.
    pub body: Map<String, Value>,
    /// Path, query and body parameter names merged into one object.
    pub params: Map<String, Value>,
}
