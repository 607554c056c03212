//! Upload Routes

use axum::{Router, routing::post};

use crate::api::app_state::AppState;
use crate::api::handlers::upload_handler::upload_csv;

/// 创建上传路由器
pub fn create_upload_router() -> Router<AppState> {
    Router::new().route("/upload-csv", post(upload_csv))
}
