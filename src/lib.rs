//! Tabquery - 表格数据导入与规则问答服务
//!
//! 按固定表结构导入 CSV 行数据，分配递增 ID 并持久化；
//! 通过关键词规则回答关于已存储记录的自然语言问题。

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;
