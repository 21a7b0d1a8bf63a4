use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Collection management
        .route(
            "/projects/:project_id/collections",
            get(handlers::list_collections::<S>),
        )
        .route("/collections", post(handlers::create_collection::<S>))
        .route("/collections/:col_id", patch(handlers::update_collection::<S>))
        .route(
            "/collections/:col_id",
            delete(handlers::delete_collection::<S>),
        )
        // Case listings resolved against their interfaces
        .route("/collections/:col_id/cases", get(handlers::get_case_list::<S>))
        .route(
            "/collections/:col_id/variables",
            get(handlers::get_case_variables::<S>),
        )
        // Import / duplicate into a collection
        .route("/collections/:col_id/import", post(handlers::import_cases::<S>))
        // Case management
        .route("/cases", post(handlers::add_case::<S>))
        .route("/cases/reorder", post(handlers::reorder_cases::<S>))
        .route("/cases/run-script", post(handlers::run_case_script))
        .route("/cases/:case_id", get(handlers::get_case::<S>))
        .route("/cases/:case_id", patch(handlers::update_case::<S>))
        .route("/cases/:case_id", delete(handlers::delete_case::<S>))
}
