//! Data Routes
//!
//! 公开的只读数据路由。

use axum::{Router, routing::get};

use crate::api::app_state::AppState;
use crate::api::handlers::data_handler::*;

/// 创建数据路由器
pub fn create_data_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/data", get(list_data))
        .route("/data/:id", get(get_data))
}
