//! Request log handler

use axum::{Json, extract::State, response::IntoResponse};

use crate::api::app_state::AppState;

/// List API request logs, newest first
///
/// GET /logs
pub async fn list_logs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.audit_log.list())
}
