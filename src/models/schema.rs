//! 表结构定义
//!
//! The column set is configuration, fixed when the store is created.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{AppError, Result};
use crate::models::record::FieldValue;

/// 列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
}

impl ColumnType {
    /// 将原始单元格转换为类型化的值
    ///
    /// Expects an already trimmed, non-empty cell.
    pub fn coerce(&self, raw: &str) -> Option<FieldValue> {
        match self {
            ColumnType::String => Some(FieldValue::Text(raw.to_string())),
            ColumnType::Integer => raw.parse::<i64>().ok().map(FieldValue::Integer),
            ColumnType::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Float),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
        }
    }
}

/// 列定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// 表结构
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
    identifier: String,
}

impl Schema {
    /// 创建表结构
    ///
    /// Column names must be unique and the identifier must name one of them.
    pub fn new(columns: Vec<ColumnSpec>, identifier: &str) -> Result<Self> {
        if columns.is_empty() {
            return Err(AppError::Config("schema has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(AppError::Config("schema column name is empty".to_string()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate schema column: {}",
                    column.name
                )));
            }
        }

        if !seen.contains(identifier) {
            return Err(AppError::Config(format!(
                "identifier column '{}' is not part of the schema",
                identifier
            )));
        }

        Ok(Self {
            columns,
            identifier: identifier.to_string(),
        })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// 主标识列（问答时用于匹配主语）
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// 检查字段集合是否与表结构完全一致
    pub fn matches_keys<'a>(&self, keys: impl IntoIterator<Item = &'a String>) -> bool {
        let mut count = 0;
        for key in keys {
            if !self.contains(key) {
                return false;
            }
            count += 1;
        }
        count == self.columns.len()
    }

    /// 按列类型修正反序列化后的值
    ///
    /// Whole floats come back from JSON as integers.
    pub fn normalize(&self, fields: &mut BTreeMap<String, FieldValue>) {
        for column in &self.columns {
            if column.kind != ColumnType::Float {
                continue;
            }
            if let Some(value) = fields.get_mut(&column.name) {
                if let FieldValue::Integer(v) = *value {
                    *value = FieldValue::Float(v as f64);
                }
            }
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            columns: vec![
                ColumnSpec::new("name", ColumnType::String),
                ColumnSpec::new("category", ColumnType::String),
                ColumnSpec::new("quantity", ColumnType::Integer),
                ColumnSpec::new("price", ColumnType::Float),
                ColumnSpec::new("location", ColumnType::String),
            ],
            identifier: "name".to_string(),
        }
    }
}
