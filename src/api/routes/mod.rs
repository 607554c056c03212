//! Routes 模块
//!
//! 定义 API 路由。

pub mod data_routes;
pub mod log_routes;
pub mod query_routes;
pub mod upload_routes;
