//! 上传 DTO

use serde::Serialize;

use crate::services::ingestion::RowError;
use crate::services::upload::{FailedRow, UploadSummary};

/// CSV 上传响应
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: Option<String>,
    pub inserted_count: usize,
    pub inserted_ids: Vec<u64>,
    pub rejected_count: usize,
    pub rejected: Vec<RowError>,
    pub failed_count: usize,
    pub failed: Vec<FailedRow>,
}

impl From<UploadSummary> for UploadResponse {
    fn from(summary: UploadSummary) -> Self {
        let mut message = format!(
            "CSV file '{}' processed: {} rows stored, {} rows rejected.",
            summary.filename.as_deref().unwrap_or("upload"),
            summary.inserted_count,
            summary.rejected.len()
        );
        if !summary.failed.is_empty() {
            message.push_str(&format!(
                " {} rows could not be saved.",
                summary.failed.len()
            ));
        }

        Self {
            message,
            filename: summary.filename,
            inserted_count: summary.inserted_count,
            inserted_ids: summary.inserted_ids,
            rejected_count: summary.rejected.len(),
            rejected: summary.rejected,
            failed_count: summary.failed.len(),
            failed: summary.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_mentions_failed_writes() {
        let summary = UploadSummary {
            filename: Some("items.csv".to_string()),
            inserted_count: 1,
            inserted_ids: vec![1],
            rejected: Vec::new(),
            failed: vec![FailedRow {
                row_index: 1,
                reason: "disk full".to_string(),
            }],
        };

        let response = UploadResponse::from(summary);

        assert_eq!(response.failed_count, 1);
        assert_eq!(
            response.message,
            "CSV file 'items.csv' processed: 1 rows stored, 0 rows rejected. 1 rows could not be saved."
        );
    }
}
