//! HTTP application wiring (Axum router + repository wiring).
//!
//! - `services.rs`: the shared state handed to every handler
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::Storage;
use crate::repository::{InMemoryRecords, RecordRepository, SqliteRecords};

pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router for the configured storage (used by `main.rs`).
pub async fn build_app(storage: &Storage) -> anyhow::Result<Router> {
    let records: Arc<dyn RecordRepository> = match storage {
        Storage::Memory => {
            tracing::warn!("using in-memory storage; records are lost on exit");
            Arc::new(InMemoryRecords::new())
        }
        Storage::Sqlite(path) => {
            tracing::info!(path = %path.display(), "using SQLite storage");
            Arc::new(SqliteRecords::open(path).await?)
        }
    };
    Ok(router(records))
}

/// Router over an explicit repository.
pub fn router(records: Arc<dyn RecordRepository>) -> Router {
    let services = Arc::new(AppServices::new(records));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
