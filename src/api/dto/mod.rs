//! DTO 模块
//!
//! 数据传输对象，用于 API 请求和响应的序列化。

pub mod data_dto;
pub mod query_dto;
pub mod upload_dto;

pub use data_dto::*;
pub use query_dto::*;
pub use upload_dto::*;
