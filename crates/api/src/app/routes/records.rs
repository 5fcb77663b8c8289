use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::repository::Upsert;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Path(collection): Path<String>,
) -> Result<Response, ApiError> {
    let records = services.list(&collection).await?;
    Ok((StatusCode::OK, Json(records)).into_response())
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let (outcome, record) = services.create(&collection, body).await?;
    Ok((status_for(outcome), Json(record)).into_response())
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let (_, record) = services.update(&collection, &id, body).await?;
    Ok((StatusCode::OK, Json(record)).into_response())
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    services.delete(&collection, &id).await?;
    Ok((StatusCode::OK, Json(json!({ "deleted": id }))).into_response())
}

fn status_for(outcome: Upsert) -> StatusCode {
    match outcome {
        Upsert::Created => StatusCode::CREATED,
        Upsert::Updated => StatusCode::OK,
    }
}
