//! 上传服务
//!
//! 校验一批原始行并逐行写入记录存储。

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::services::ingestion::{IngestionValidator, RawRow, RowError};
use crate::storage::record_store::RecordStore;

/// 上传汇总
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub filename: Option<String>,
    pub inserted_count: usize,
    pub inserted_ids: Vec<u64>,
    pub rejected: Vec<RowError>,
    /// 校验通过但写入失败的行
    pub failed: Vec<FailedRow>,
}

/// 写入失败的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRow {
    /// 行在本批次中的位置（从 0 开始，不含表头）
    pub row_index: usize,
    pub reason: String,
}

/// 上传服务
pub struct UploadService {
    validator: IngestionValidator,
    store: Arc<RecordStore>,
}

impl UploadService {
    pub fn new(validator: IngestionValidator, store: Arc<RecordStore>) -> Self {
        Self { validator, store }
    }

    /// 导入一批原始行
    ///
    /// Invalid rows are reported and skipped; the valid ones are still
    /// inserted in their original order. A failed write is reported for
    /// its row and the remaining rows are still attempted.
    pub async fn ingest(&self, filename: Option<&str>, rows: &[RawRow]) -> Result<UploadSummary> {
        let outcome = self.validator.validate(rows);
        let source = filename.unwrap_or("<batch>");

        let rejected_rows: HashSet<usize> = outcome.errors.iter().map(|e| e.row_index).collect();
        let valid_rows = (0..rows.len()).filter(|i| !rejected_rows.contains(i));

        let mut inserted_ids = Vec::with_capacity(outcome.valid.len());
        let mut failed = Vec::new();
        for (row_index, candidate) in valid_rows.zip(outcome.valid) {
            match self.store.insert(candidate, filename).await {
                Ok(record) => inserted_ids.push(record.id),
                Err(e) => {
                    warn!("Failed to store row {} from {}: {}", row_index, source, e);
                    failed.push(FailedRow {
                        row_index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !outcome.errors.is_empty() {
            warn!(
                "Rejected {} of {} rows from {}",
                outcome.errors.len(),
                rows.len(),
                source
            );
        }
        info!("Ingested {} rows from {}", inserted_ids.len(), source);

        Ok(UploadSummary {
            filename: filename.map(str::to_string),
            inserted_count: inserted_ids.len(),
            inserted_ids,
            rejected: outcome.errors,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::record::Record;
    use crate::models::schema::Schema;
    use crate::services::ingestion::{RowErrorKind, parse_csv};
    use crate::storage::memory::MemoryStorage;
    use crate::storage::repository::RecordRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Memory repository whose second append fails
    #[derive(Default)]
    struct FlakyRepository {
        inner: MemoryStorage,
        appends: AtomicUsize,
    }

    #[async_trait]
    impl RecordRepository for FlakyRepository {
        async fn append(&self, record: &Record) -> Result<()> {
            if self.appends.fetch_add(1, Ordering::SeqCst) == 1 {
                return Err(AppError::Database("disk full".to_string()));
            }
            RecordRepository::append(&self.inner, record).await
        }

        async fn load_all(&self) -> Result<Vec<Record>> {
            RecordRepository::load_all(&self.inner).await
        }

        async fn last_issued_id(&self) -> Result<u64> {
            self.inner.last_issued_id().await
        }

        async fn save_last_issued_id(&self, id: u64) -> Result<()> {
            self.inner.save_last_issued_id(id).await
        }

        fn repository_type(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_k_valid_m_invalid() {
        let schema = Arc::new(Schema::default());
        let store = Arc::new(RecordStore::in_memory(schema.clone()));
        let service = UploadService::new(IngestionValidator::new(schema), store.clone());

        let rows = parse_csv(
            "name,category,quantity,price,location\n\
             apple,fruit,10,1.5,aisle3\n\
             pear,fruit,many,2.0,aisle3\n\
             hat,clothing,4,12,aisle7\n\
             scarf,clothing,2,,aisle7\n\
             lamp,home,1,30.5,aisle9\n",
        )
        .unwrap();

        let summary = service.ingest(Some("items.csv"), &rows).await.unwrap();

        assert_eq!(summary.inserted_count, 3);
        assert_eq!(summary.inserted_ids, vec![1, 2, 3]);
        assert_eq!(summary.rejected.len(), 2);
        assert_eq!(summary.rejected[0].row_index, 1);
        assert_eq!(summary.rejected[0].kind, RowErrorKind::TypeMismatch);
        assert_eq!(summary.rejected[1].row_index, 3);
        assert_eq!(summary.rejected[1].kind, RowErrorKind::MissingField);

        let names: Vec<String> = store
            .get_all()
            .iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["apple", "hat", "lamp"]);
        assert!(store.get_all().iter().all(|r| r.source.as_deref() == Some("items.csv")));
    }

    #[tokio::test]
    async fn test_ids_continue_across_uploads() {
        let schema = Arc::new(Schema::default());
        let store = Arc::new(RecordStore::in_memory(schema.clone()));
        let service = UploadService::new(IngestionValidator::new(schema), store);

        let rows = parse_csv("name,category,quantity,price,location\napple,fruit,10,1.5,aisle3\n")
            .unwrap();
        let first = service.ingest(None, &rows).await.unwrap();
        let second = service.ingest(None, &rows).await.unwrap();

        assert_eq!(first.inserted_ids, vec![1]);
        assert_eq!(second.inserted_ids, vec![2]);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_per_row() {
        let schema = Arc::new(Schema::default());
        let repository: Arc<dyn RecordRepository> = Arc::new(FlakyRepository::default());
        let store = Arc::new(RecordStore::open(schema.clone(), repository).await.unwrap());
        let service = UploadService::new(IngestionValidator::new(schema), store.clone());

        let rows = parse_csv(
            "name,category,quantity,price,location\n\
             apple,fruit,10,1.5,aisle3\n\
             pear,fruit,oops,2.0,aisle3\n\
             hat,clothing,4,12,aisle7\n\
             lamp,home,1,30.5,aisle9\n",
        )
        .unwrap();

        let summary = service.ingest(Some("items.csv"), &rows).await.unwrap();

        assert_eq!(summary.inserted_ids, vec![1, 3]);
        assert_eq!(summary.inserted_count, 2);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(summary.rejected[0].row_index, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].row_index, 2);
        assert!(summary.failed[0].reason.contains("disk full"));
        assert_eq!(store.len(), 2);
    }
}
