//! 数据 DTO
//!
//! 已存储记录的响应结构。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::record::{FieldValue, Record};

/// 数据项响应
#[derive(Debug, Clone, Serialize)]
pub struct DataItemResponse {
    /// 记录 ID
    pub id: u64,
    /// 来源文件名
    pub original_filename: Option<String>,
    /// 行数据
    pub row_data: BTreeMap<String, FieldValue>,
    /// 上传时间
    pub upload_timestamp: DateTime<Utc>,
}

impl From<Record> for DataItemResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            original_filename: record.source,
            row_data: record.fields,
            upload_timestamp: record.uploaded_at,
        }
    }
}
