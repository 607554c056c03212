//! Log Routes

use axum::{Router, routing::get};

use crate::api::app_state::AppState;
use crate::api::handlers::log_handler::list_logs;

/// 创建日志路由器
pub fn create_log_router() -> Router<AppState> {
    Router::new().route("/logs", get(list_logs))
}
