//! 数据导入校验服务
//!
//! Turns raw string rows into typed candidates and reports every rejected
//! row with its position, column and reason.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::record::RecordCandidate;
use crate::models::schema::Schema;

/// 原始行：列名 → 单元格文本
pub type RawRow = HashMap<String, String>;

/// 行错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowErrorKind {
    MissingField,
    UnexpectedField,
    TypeMismatch,
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowErrorKind::MissingField => write!(f, "MISSING_FIELD"),
            RowErrorKind::UnexpectedField => write!(f, "UNEXPECTED_FIELD"),
            RowErrorKind::TypeMismatch => write!(f, "TYPE_MISMATCH"),
        }
    }
}

/// 行校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 行在本批次中的位置（从 0 开始，不含表头）
    pub row_index: usize,
    pub kind: RowErrorKind,
    pub column: Option<String>,
    pub reason: String,
}

/// 校验结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub valid: Vec<RecordCandidate>,
    pub errors: Vec<RowError>,
}

/// 导入校验器
#[derive(Debug, Clone)]
pub struct IngestionValidator {
    schema: Arc<Schema>,
}

impl IngestionValidator {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    /// 校验一批原始行
    ///
    /// Valid rows keep their relative order; each rejected row yields
    /// exactly one error.
    pub fn validate(&self, raw_rows: &[RawRow]) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        for (row_index, row) in raw_rows.iter().enumerate() {
            match self.validate_row(row_index, row) {
                Ok(candidate) => outcome.valid.push(candidate),
                Err(error) => outcome.errors.push(error),
            }
        }

        outcome
    }

    fn validate_row(&self, row_index: usize, row: &RawRow) -> std::result::Result<RecordCandidate, RowError> {
        let columns = self.schema.columns();

        for column in columns {
            let present = row
                .get(&column.name)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            if !present {
                return Err(RowError {
                    row_index,
                    kind: RowErrorKind::MissingField,
                    column: Some(column.name.clone()),
                    reason: format!("required column '{}' is missing or empty", column.name),
                });
            }
        }

        let mut unexpected: Vec<&String> = row.keys().filter(|k| !self.schema.contains(k)).collect();
        unexpected.sort();
        if let Some(column) = unexpected.first() {
            return Err(RowError {
                row_index,
                kind: RowErrorKind::UnexpectedField,
                column: Some(column.to_string()),
                reason: format!("column '{}' is not part of the schema", column),
            });
        }

        let mut fields = BTreeMap::new();
        for column in columns {
            let raw = row[&column.name].trim();
            let value = column.kind.coerce(raw).ok_or_else(|| RowError {
                row_index,
                kind: RowErrorKind::TypeMismatch,
                column: Some(column.name.clone()),
                reason: format!("'{}' is not a valid {}", raw, column.kind),
            })?;
            fields.insert(column.name.clone(), value);
        }

        Ok(RecordCandidate::new(fields))
    }
}

/// 解析 CSV 文本为原始行
///
/// Cells missing from short rows are simply absent from the row map, so
/// they surface later as `MISSING_FIELD`. Non-empty cells past the last
/// header are kept under a positional name and surface as
/// `UNEXPECTED_FIELD`.
pub fn parse_csv(content: &str) -> Result<Vec<RawRow>> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Uploaded CSV file is empty.".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Could not parse CSV file: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut seen = HashSet::new();
    for header in &headers {
        if header.is_empty() {
            return Err(AppError::Validation("CSV header contains an empty column name.".to_string()));
        }
        if !seen.insert(header.as_str()) {
            return Err(AppError::Validation(format!(
                "CSV header contains duplicate column '{}'.",
                header
            )));
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| AppError::Validation(format!("Could not parse CSV file: {}", e)))?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.clone(), cell.to_string()))
            .collect();
        for (position, cell) in record.iter().enumerate().skip(headers.len()) {
            if !cell.trim().is_empty() {
                row.insert(unnamed_column(position), cell.to_string());
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::Validation("Uploaded CSV file is empty.".to_string()));
    }

    Ok(rows)
}

/// 表头之外单元格的列名（从 1 开始计数）
fn unnamed_column(position: usize) -> String {
    format!("<unnamed column {}>", position + 1)
}
