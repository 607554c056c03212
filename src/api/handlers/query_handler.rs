//! 问答处理程序

use axum::{Json, extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    api::{
        app_state::AppState,
        dto::query_dto::{AskRequest, AskResponse},
    },
    error::AppError,
};

/// Answer a natural language question about the stored data
///
/// POST /ask-data-ai
pub async fn ask_data(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question must not be empty".to_string()));
    }

    let result = state.query_engine.answer(question);
    state.metrics.record_question(result.matched);
    info!(matched = result.matched, "Answered question: {}", question);

    Ok(Json(AskResponse::new(question.to_string(), result)))
}
