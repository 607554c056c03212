use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 单元格值
///
/// Serialized untagged, so JSON sees plain strings and numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 整数
    Integer(i64),
    /// 浮点数
    Float(f64),
    /// 文本
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// 已校验、尚未分配 ID 的记录
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordCandidate {
    pub fields: BTreeMap<String, FieldValue>,
}

impl RecordCandidate {
    pub fn new(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// 添加字段（构建器风格）
    pub fn with(mut self, column: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }
}

/// 记录实体
///
/// One ingested row. The store hands out copies and never mutates a record
/// once its ID has been issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 顺序分配的记录 ID（从 1 开始）
    pub id: u64,

    /// 列名 → 值
    pub fields: BTreeMap<String, FieldValue>,

    /// 原始上传文件名
    pub source: Option<String>,

    /// 入库时间
    pub uploaded_at: DateTime<Utc>,
}

impl Record {
    pub fn new(id: u64, candidate: RecordCandidate, source: Option<String>) -> Self {
        Self {
            id,
            fields: candidate.fields,
            source,
            uploaded_at: Utc::now(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }
}
