//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod data_handler;
pub mod log_handler;
pub mod query_handler;
pub mod upload_handler;

pub use data_handler::*;
pub use log_handler::*;
pub use query_handler::*;
pub use upload_handler::*;
