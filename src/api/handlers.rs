use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::logic::{
    CaseResolver, DuplicateError, DuplicateOutcome, DuplicateRequest, Duplicator, ScriptRuntime,
};
use crate::model::{
    Case, CaseUpdate, CaseVariables, Collection, CollectionUpdate, ExecutionContext, Id, NewCase,
    NewCollection, ResolvedCase, ScriptOutcome, UserContext,
};
use crate::store::traits::{AuthAction, Store};

pub type AppState<S> = Arc<S>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn not_found(message: &str) -> HandlerError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message)))
}

fn internal_error(error: anyhow::Error) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&error.to_string())),
    )
}

async fn require_auth<S: Store>(
    store: &S,
    user: &UserContext,
    project_id: &Id,
    action: AuthAction,
) -> Result<(), HandlerError> {
    match store.check_auth(user, project_id, action).await {
        Ok(true) => Ok(()),
        Ok(false) => Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("no permission for this project")),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// A collection together with its raw case list, as the project-level
/// listing returns it.
#[derive(Debug, Serialize)]
pub struct CollectionWithCases {
    #[serde(flatten)]
    pub collection: Collection,
    pub case_list: Vec<Case>,
}

#[derive(Debug, Serialize)]
pub struct CaseListResponse {
    pub items: Vec<ResolvedCase>,
    pub total: usize,
    pub collection: Collection,
}

pub async fn list_collections<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(project_id): Path<Id>,
) -> Result<Json<ListResponse<CollectionWithCases>>, HandlerError> {
    require_auth(&*store, &user, &project_id, AuthAction::View).await?;
    let collections = store
        .list_collections(&project_id)
        .await
        .map_err(internal_error)?;

    let mut items = Vec::with_capacity(collections.len());
    for collection in collections {
        let case_list = store
            .list_cases(&collection.id)
            .await
            .map_err(internal_error)?;
        items.push(CollectionWithCases {
            collection,
            case_list,
        });
    }
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

pub async fn create_collection<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Json(new): Json<NewCollection>,
) -> Result<Json<Collection>, HandlerError> {
    if new.project_id.is_empty() {
        return Err(bad_request("project_id must not be empty"));
    }
    if new.name.is_empty() {
        return Err(bad_request("name must not be empty"));
    }
    require_auth(&*store, &user, &new.project_id, AuthAction::Edit).await?;

    let collection = store
        .save_collection(new, &user)
        .await
        .map_err(internal_error)?;
    log::info!(
        "user {} created collection {} ({}) in project {}",
        user.user_id,
        collection.name,
        collection.id,
        collection.project_id
    );
    Ok(Json(collection))
}

pub async fn update_collection<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(col_id): Path<Id>,
    Json(update): Json<CollectionUpdate>,
) -> Result<Json<Collection>, HandlerError> {
    let Some(existing) = store.get_collection(&col_id).await.map_err(internal_error)? else {
        return Err(not_found("collection not found"));
    };
    require_auth(&*store, &user, &existing.project_id, AuthAction::Edit).await?;

    let updated = store
        .update_collection(&col_id, update, &user)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("collection not found"))?;
    log::info!(
        "user {} updated collection {} ({})",
        user.user_id,
        updated.name,
        updated.id
    );
    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub cases_removed: usize,
}

pub async fn delete_collection<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(col_id): Path<Id>,
) -> Result<Json<DeletedResponse>, HandlerError> {
    let Some(collection) = store.get_collection(&col_id).await.map_err(internal_error)? else {
        return Err(not_found("collection not found"));
    };
    if collection.created_by != user.user_id {
        require_auth(&*store, &user, &collection.project_id, AuthAction::Danger).await?;
    }

    let deleted = store
        .delete_collection(&col_id)
        .await
        .map_err(internal_error)?;
    let cases_removed = store
        .delete_cases_in_collection(&col_id)
        .await
        .map_err(internal_error)?;
    log::info!(
        "user {} deleted collection {} ({}) and its {} cases",
        user.user_id,
        collection.name,
        col_id,
        cases_removed
    );
    Ok(Json(DeletedResponse {
        deleted,
        cases_removed,
    }))
}

pub async fn get_case_list<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(col_id): Path<Id>,
) -> Result<Json<CaseListResponse>, HandlerError> {
    let Some(collection) = store.get_collection(&col_id).await.map_err(internal_error)? else {
        return Err(not_found("collection not found"));
    };
    require_auth(&*store, &user, &collection.project_id, AuthAction::View).await?;

    let cases = store.list_cases(&col_id).await.map_err(internal_error)?;
    let items = CaseResolver::resolve_list(&*store, cases)
        .await
        .map_err(internal_error)?;
    let total = items.len();
    Ok(Json(CaseListResponse {
        items,
        total,
        collection,
    }))
}

pub async fn get_case_variables<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(col_id): Path<Id>,
) -> Result<Json<ListResponse<CaseVariables>>, HandlerError> {
    let Some(collection) = store.get_collection(&col_id).await.map_err(internal_error)? else {
        return Err(not_found("collection not found"));
    };
    require_auth(&*store, &user, &collection.project_id, AuthAction::View).await?;

    let cases = store.list_cases(&col_id).await.map_err(internal_error)?;
    let items = CaseResolver::variables(&*store, cases)
        .await
        .map_err(internal_error)?;
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

/// Import request body; the destination collection comes from the path.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub project_id: Id,
    pub interface_ids: Vec<Id>,
    #[serde(default)]
    pub source_case_ids: Vec<Id>,
}

pub async fn import_cases<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(col_id): Path<Id>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<DuplicateOutcome>, HandlerError> {
    require_auth(&*store, &user, &req.project_id, AuthAction::Edit).await?;

    let outcome = Duplicator::duplicate(
        &*store,
        &user,
        DuplicateRequest {
            col_id,
            project_id: req.project_id,
            interface_ids: req.interface_ids,
            source_case_ids: req.source_case_ids,
        },
    )
    .await
    .map_err(|e| match e {
        DuplicateError::Validation(message) => bad_request(&message),
        DuplicateError::Store(inner) => internal_error(inner),
    })?;
    Ok(Json(outcome))
}

pub async fn add_case<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Json(new): Json<NewCase>,
) -> Result<Json<Case>, HandlerError> {
    if new.project_id.is_empty() {
        return Err(bad_request("project_id must not be empty"));
    }
    if new.interface_id.is_empty() {
        return Err(bad_request("interface_id must not be empty"));
    }
    if new.col_id.is_empty() {
        return Err(bad_request("col_id must not be empty"));
    }
    if new.name.is_empty() {
        return Err(bad_request("name must not be empty"));
    }
    require_auth(&*store, &user, &new.project_id, AuthAction::Edit).await?;

    let case = store.save_case(new, &user).await.map_err(internal_error)?;
    log::info!(
        "user {} added case {} ({}) to collection {}",
        user.user_id,
        case.name,
        case.id,
        case.col_id
    );
    Ok(Json(case))
}

pub async fn get_case<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(case_id): Path<Id>,
) -> Result<Json<ResolvedCase>, HandlerError> {
    let Some(case) = store.get_case(&case_id).await.map_err(internal_error)? else {
        return Err(not_found("case not found"));
    };
    require_auth(&*store, &user, &case.project_id, AuthAction::View).await?;

    let Some(interface) = store
        .get_interface(&case.interface_id)
        .await
        .map_err(internal_error)?
    else {
        return Err(not_found("interface for this case no longer exists"));
    };
    Ok(Json(CaseResolver::join(case, interface)))
}

pub async fn update_case<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(case_id): Path<Id>,
    Json(update): Json<CaseUpdate>,
) -> Result<Json<Case>, HandlerError> {
    let Some(mut case) = store.get_case(&case_id).await.map_err(internal_error)? else {
        return Err(not_found("case not found"));
    };
    require_auth(&*store, &user, &case.project_id, AuthAction::Edit).await?;

    update.apply_to(&mut case);
    let case = store
        .update_case(case, &user)
        .await
        .map_err(internal_error)?;
    log::info!(
        "user {} updated case {} ({}) in collection {}",
        user.user_id,
        case.name,
        case.id,
        case.col_id
    );
    Ok(Json(case))
}

#[derive(Debug, Deserialize)]
pub struct CaseIndexUpdate {
    pub id: Id,
    pub index: i64,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub updated: usize,
}

/// Bulk re-index. Individual failures are logged and skipped, matching the
/// best-effort semantics of ordering updates.
pub async fn reorder_cases<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Json(updates): Json<Vec<CaseIndexUpdate>>,
) -> Result<Json<ReorderResponse>, HandlerError> {
    let mut updated = 0;
    for item in updates {
        let Some(case) = store.get_case(&item.id).await.map_err(internal_error)? else {
            log::warn!("reorder skipped unknown case {}", item.id);
            continue;
        };
        require_auth(&*store, &user, &case.project_id, AuthAction::Edit).await?;
        match store.set_case_index(&item.id, item.index).await {
            Ok(true) => updated += 1,
            Ok(false) => log::warn!("reorder skipped unknown case {}", item.id),
            Err(e) => log::error!("reorder of case {} failed: {e}", item.id),
        }
    }
    Ok(Json(ReorderResponse { updated }))
}

#[derive(Debug, Serialize)]
pub struct CaseDeletedResponse {
    pub deleted: bool,
}

pub async fn delete_case<S: Store>(
    State(store): State<AppState<S>>,
    user: UserContext,
    Path(case_id): Path<Id>,
) -> Result<Json<CaseDeletedResponse>, HandlerError> {
    let Some(case) = store.get_case(&case_id).await.map_err(internal_error)? else {
        return Err(not_found("case not found"));
    };
    if case.created_by != user.user_id {
        require_auth(&*store, &user, &case.project_id, AuthAction::Danger).await?;
    }

    let deleted = store.delete_case(&case_id).await.map_err(internal_error)?;
    log::info!(
        "user {} deleted case {} ({}) from collection {}",
        user.user_id,
        case.name,
        case_id,
        case.col_id
    );
    Ok(Json(CaseDeletedResponse { deleted }))
}

/// The captured HTTP response a script runs against.
#[derive(Debug, Default, Deserialize)]
pub struct CapturedResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub headers: Value,
}

#[derive(Debug, Deserialize)]
pub struct RunScriptRequest {
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub response: CapturedResponse,
    #[serde(default)]
    pub records: Value,
    #[serde(default)]
    pub params: Value,
}

/// Runs a case assertion script. Script faults are contained in the outcome
/// body; this endpoint itself only fails on malformed requests.
pub async fn run_case_script(
    Extension(runtime): Extension<Arc<ScriptRuntime>>,
    Json(req): Json<RunScriptRequest>,
) -> Json<ScriptOutcome> {
    let context = ExecutionContext {
        status: req.response.status,
        body: req.response.body,
        headers: req.response.headers,
        records: req.records,
        params: req.params,
    };
    Json(runtime.run(&req.script, context))
}
