pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    merge_param_overlay, CaseRef, CaseResolver, DuplicateError, DuplicateOutcome,
    DuplicateRequest, Duplicator, ScriptLimits, ScriptRuntime,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, Store};

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::{serve, Extension};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with INFO level only (suppress DEBUG logs)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    // Load configuration
    let config = crate::config::AppConfig::load()?;

    let store = Arc::new(crate::store::MemoryStore::new());

    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        crate::seed::load_seed_data(&*store).await?;
    }

    let runtime = Arc::new(crate::logic::ScriptRuntime::new(config.script_limits()));
    let app = crate::api::routes::create_router()
        .layer(Extension(runtime))
        .with_state(store);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}
