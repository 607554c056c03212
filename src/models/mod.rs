//! 核心数据模型模块
//!
//! 定义 Tabquery 的核心数据结构：Record, Schema, QueryResult, AuditEntry。

pub mod audit;
pub mod query;
pub mod record;
pub mod schema;

pub use audit::AuditEntry;
pub use query::{AttributeIntent, QueryResult};
pub use record::{FieldValue, Record, RecordCandidate};
pub use schema::{ColumnSpec, ColumnType, Schema};
