//! 服务模块

pub mod audit_log;
pub mod ingestion;
pub mod query_engine;
pub mod upload;

pub use audit_log::AuditLog;
pub use ingestion::{IngestionValidator, RawRow, RowError, RowErrorKind, ValidationOutcome, parse_csv};
pub use query_engine::QueryEngine;
pub use upload::{FailedRow, UploadService, UploadSummary};
