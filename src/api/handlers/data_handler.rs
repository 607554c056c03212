//! Data API Handlers
//!
//! Read access to stored records.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::data_dto::DataItemResponse},
    error::AppError,
};

/// Welcome message
///
/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the tabquery data API. Upload a CSV to /upload-csv and ask questions at /ask-data-ai."
    }))
}

/// List all stored records in insertion order
///
/// GET /data
pub async fn list_data(State(state): State<AppState>) -> impl IntoResponse {
    let items: Vec<DataItemResponse> = state
        .record_store
        .get_all()
        .into_iter()
        .map(DataItemResponse::from)
        .collect();

    debug!("Listing {} records", items.len());
    Json(items)
}

/// Get a single record by ID
///
/// GET /data/:id
pub async fn get_data(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.record_store.get_by_id(id)?;
    Ok(Json(DataItemResponse::from(record)))
}
