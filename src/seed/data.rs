use crate::model::{
    BodyType, Interface, NamedParam, NewCase, NewCollection, UserContext,
};
use crate::store::traits::Store;
use anyhow::Result;
use chrono::Utc;

/// Helper to build an interface with system audit info.
fn system_interface(
    id: &str,
    title: &str,
    path: &str,
    method: &str,
    req_query: Vec<NamedParam>,
    req_body_other: Option<&str>,
    res_body: Option<&str>,
) -> Interface {
    let now = Utc::now();
    Interface {
        id: id.to_string(),
        project_id: "demo-project".to_string(),
        title: title.to_string(),
        path: path.to_string(),
        method: method.to_string(),
        req_query,
        req_headers: vec![NamedParam::new("Content-Type", "application/json")],
        req_params: Vec::new(),
        req_body_form: Vec::new(),
        req_body_type: BodyType::Json,
        req_body_other: req_body_other.map(String::from),
        res_body: res_body.map(String::from),
        res_body_type: Some("json".to_string()),
        created_at: now,
        updated_at: now,
    }
}

/// Loads a small demo project: a login interface, a profile interface, and a
/// smoke-test collection whose second case references the first case's
/// recorded token.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    let user = UserContext::system();

    store
        .upsert_interface(system_interface(
            "demo-if-login",
            "Login",
            "/api/login",
            "POST",
            Vec::new(),
            Some(r#"{"user":"","pass":""}"#),
            Some(r#"{"token":"","expires":0}"#),
        ))
        .await?;
    store
        .upsert_interface(system_interface(
            "demo-if-profile",
            "Get profile",
            "/api/profile",
            "GET",
            vec![NamedParam::new("token", ""), NamedParam::new("fields", "")],
            None,
            Some(r#"{"name":"","email":""}"#),
        ))
        .await?;

    let collection = store
        .save_collection(
            NewCollection {
                project_id: "demo-project".to_string(),
                name: "Smoke tests".to_string(),
                desc: Some("Login then fetch the profile".to_string()),
            },
            &user,
        )
        .await?;

    let login_case = store
        .save_case(
            NewCase {
                interface_id: "demo-if-login".to_string(),
                col_id: collection.id.clone(),
                project_id: "demo-project".to_string(),
                name: "Login as demo".to_string(),
                case_env: None,
                index: 0,
                req_query: Vec::new(),
                req_headers: Vec::new(),
                req_params: Vec::new(),
                req_body_form: Vec::new(),
                req_body_type: BodyType::Json,
                req_body_other: Some(r#"{"user":"demo","pass":"demo"}"#.to_string()),
            },
            &user,
        )
        .await?;

    store
        .save_case(
            NewCase {
                interface_id: "demo-if-profile".to_string(),
                col_id: collection.id.clone(),
                project_id: "demo-project".to_string(),
                name: "Fetch own profile".to_string(),
                case_env: None,
                index: 1,
                req_query: vec![
                    NamedParam::new("token", &format!("$.{}.data.token", login_case.id)),
                    NamedParam::new("fields", "name,email"),
                ],
                req_headers: Vec::new(),
                req_params: Vec::new(),
                req_body_form: Vec::new(),
                req_body_type: BodyType::Json,
                req_body_other: None,
            },
            &user,
        )
        .await?;

    log::info!(
        "seeded demo project with collection {} ({})",
        collection.name,
        collection.id
    );
    Ok(())
}
