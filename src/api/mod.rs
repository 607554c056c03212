//! API 模块
//!
//! 提供 REST API 支持。

#[cfg(test)]
mod api_tests;
pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::app_state::AppState;
use crate::observability::{ObservabilityState, audit_middleware, create_observability_router};
use crate::security::middleware::{basic_auth_middleware, security_headers_middleware};

/// 创建 API 路由器
///
/// Reads are public. Uploads, questions and the request log require
/// Basic credentials.
pub fn create_router(app_state: AppState) -> Router {
    with_request_layers(api_routes(app_state.clone()), app_state)
}

/// 创建完整应用路由器（API 与可观测性端点）
///
/// Every route, health and metrics included, passes through the audit and
/// trace layers.
pub fn create_app(app_state: AppState, observability_state: Arc<ObservabilityState>) -> Router {
    let router = api_routes(app_state.clone())
        .merge(create_observability_router(observability_state));
    with_request_layers(router, app_state)
}

fn api_routes(app_state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::upload_routes::create_upload_router())
        .merge(routes::query_routes::create_query_router())
        .merge(routes::log_routes::create_log_router())
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            basic_auth_middleware,
        ));

    Router::new()
        .merge(routes::data_routes::create_data_router())
        .merge(protected)
        .layer(DefaultBodyLimit::max(app_state.max_upload_size))
        .with_state(app_state)
}

fn with_request_layers(router: Router, app_state: AppState) -> Router {
    router
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn_with_state(
            app_state,
            audit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
