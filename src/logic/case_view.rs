use crate::logic::overlay::merge_param_overlay;
use crate::model::{BodyType, Case, CaseVariables, ResolvedCase};
use crate::store::traits::Store;
use anyhow::Result;
use itertools::Itertools;
use serde_json::{Map, Value};

pub struct CaseResolver;

impl CaseResolver {
    /// Joins one case with its interface and merges every parameter overlay.
    ///
    /// Returns `Ok(None)` when the interface is gone: the orphaned case is
    /// deleted on sight (an expected repair event, not an error) and the
    /// surrounding listing goes on.
    pub async fn resolve<S: Store>(store: &S, case: Case) -> Result<Option<ResolvedCase>> {
        let Some(interface) = store.get_interface(&case.interface_id).await? else {
            log::warn!(
                "case {} references deleted interface {}; removing orphaned case",
                case.id,
                case.interface_id
            );
            store.delete_case(&case.id).await?;
            return Ok(None);
        };

        Ok(Some(Self::join(case, interface)))
    }

    /// Pure join of a case with its (already loaded) interface.
    pub fn join(case: Case, interface: crate::model::Interface) -> ResolvedCase {
        ResolvedCase {
            id: case.id,
            interface_id: case.interface_id,
            col_id: case.col_id,
            project_id: case.project_id,
            name: case.name,
            case_env: case.case_env,
            index: case.index,
            path: interface.path,
            method: interface.method,
            req_query: merge_param_overlay(&interface.req_query, &case.req_query),
            req_headers: merge_param_overlay(&interface.req_headers, &case.req_headers),
            req_params: merge_param_overlay(&interface.req_params, &case.req_params),
            req_body_form: merge_param_overlay(&interface.req_body_form, &case.req_body_form),
            req_body_type: interface.req_body_type,
            req_body_other: case.req_body_other,
            res_body: interface.res_body,
            res_body_type: interface.res_body_type,
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }

    /// Resolves a whole collection, self-healing orphans, in index order.
    pub async fn resolve_list<S: Store>(store: &S, cases: Vec<Case>) -> Result<Vec<ResolvedCase>> {
        let mut out = Vec::with_capacity(cases.len());
        for case in cases {
            if let Some(resolved) = Self::resolve(store, case).await? {
                out.push(resolved);
            }
        }
        Ok(out
            .into_iter()
            .sorted_by_key(|resolved| resolved.index)
            .collect())
    }

    /// Variable-oriented view over a collection's cases: response body
    /// template plus one flat object of every substitutable parameter name.
    /// The same orphan self-healing applies.
    pub async fn variables<S: Store>(store: &S, cases: Vec<Case>) -> Result<Vec<CaseVariables>> {
        let mut out = Vec::with_capacity(cases.len());
        for case in cases {
            let Some(interface) = store.get_interface(&case.interface_id).await? else {
                log::warn!(
                    "case {} references deleted interface {}; removing orphaned case",
                    case.id,
                    case.interface_id
                );
                store.delete_case(&case.id).await?;
                continue;
            };

            let body = parse_object(interface.res_body.as_deref());

            let mut params = Map::new();
            for param in &interface.req_params {
                params.insert(param.name.clone(), Value::String(String::new()));
            }
            for param in &interface.req_query {
                params.insert(param.name.clone(), Value::String(String::new()));
            }
            if interface.req_body_type == BodyType::Form {
                for param in &interface.req_body_form {
                    params.insert(param.name.clone(), Value::String(String::new()));
                }
            } else {
                for (key, value) in parse_object(interface.req_body_other.as_deref()) {
                    params.insert(key, value);
                }
            }

            out.push(CaseVariables {
                id: case.id,
                name: case.name,
                index: case.index,
                body,
                params,
            });
        }
        Ok(out)
    }
}

fn parse_object(raw: Option<&str>) -> Map<String, Value> {
    match raw.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Object(map))) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interface, NamedParam, NewCase, UserContext};
    use crate::store::traits::{CaseStore, InterfaceStore};
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn interface(id: &str) -> Interface {
        let now = Utc::now();
        Interface {
            id: id.to_string(),
            project_id: "project-1".to_string(),
            title: "Login".to_string(),
            path: "/api/login".to_string(),
            method: "POST".to_string(),
            req_query: vec![NamedParam::new("redirect", "")],
            req_headers: Vec::new(),
            req_params: vec![NamedParam::new("tenant", "")],
            req_body_form: Vec::new(),
            req_body_type: BodyType::Json,
            req_body_other: Some(r#"{"user":"","pass":""}"#.to_string()),
            res_body: Some(r#"{"token":"","expires":0}"#.to_string()),
            res_body_type: Some("json".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn new_case(interface_id: &str, name: &str) -> NewCase {
        NewCase {
            interface_id: interface_id.to_string(),
            col_id: "col-1".to_string(),
            project_id: "project-1".to_string(),
            name: name.to_string(),
            case_env: None,
            index: 0,
            req_query: vec![NamedParam::new("redirect", "/home")],
            req_headers: Vec::new(),
            req_params: Vec::new(),
            req_body_form: Vec::new(),
            req_body_type: BodyType::Json,
            req_body_other: None,
        }
    }

    #[tokio::test]
    async fn resolving_merges_overlays_onto_the_interface_schema() {
        let store = MemoryStore::new();
        store.upsert_interface(interface("if-1")).await.unwrap();
        let case = store
            .save_case(new_case("if-1", "login ok"), &UserContext::system())
            .await
            .unwrap();

        let resolved = CaseResolver::resolve(&store, case).await.unwrap().unwrap();
        assert_eq!(resolved.path, "/api/login");
        assert_eq!(resolved.method, "POST");
        assert_eq!(resolved.req_query[0].value, "/home");
        // schema rows without an overlay keep their defaults
        assert_eq!(resolved.req_params[0].value, "");
    }

    #[tokio::test]
    async fn orphaned_cases_are_deleted_and_skipped() {
        let store = MemoryStore::new();
        store.upsert_interface(interface("if-1")).await.unwrap();
        let kept = store
            .save_case(new_case("if-1", "kept"), &UserContext::system())
            .await
            .unwrap();
        let orphan = store
            .save_case(new_case("if-gone", "orphan"), &UserContext::system())
            .await
            .unwrap();

        let cases = store.list_cases(&"col-1".to_string()).await.unwrap();
        let resolved = CaseResolver::resolve_list(&store, cases).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, kept.id);
        // the orphan is gone from the store as well
        assert!(store.get_case(&orphan.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn variables_view_flattens_parameter_names() {
        let store = MemoryStore::new();
        store.upsert_interface(interface("if-1")).await.unwrap();
        store
            .save_case(new_case("if-1", "login ok"), &UserContext::system())
            .await
            .unwrap();

        let cases = store.list_cases(&"col-1".to_string()).await.unwrap();
        let variables = CaseResolver::variables(&store, cases).await.unwrap();
        assert_eq!(variables.len(), 1);
        let vars = &variables[0];
        assert!(vars.body.contains_key("token"));
        for name in ["tenant", "redirect", "user", "pass"] {
            assert!(vars.params.contains_key(name), "missing param {name}");
        }
    }
}
