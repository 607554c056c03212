//! Query Routes

use axum::{Router, routing::post};

use crate::api::app_state::AppState;
use crate::api::handlers::query_handler::ask_data;

/// 创建问答路由器
pub fn create_query_router() -> Router<AppState> {
    Router::new().route("/ask-data-ai", post(ask_data))
}
