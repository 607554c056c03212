//! 内存存储
//!
//! 进程内实现，开发环境与测试使用。

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::models::audit::AuditEntry;
use crate::models::record::Record;
use crate::storage::repository::{AuditRepository, RecordRepository};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<Vec<Record>>,
    last_issued_id: Mutex<u64>,
    audit: Mutex<Vec<AuditEntry>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空记录表（ID 序列保留）
    pub fn clear_records(&self) {
        self.records.lock().clear();
    }
}

#[async_trait]
impl RecordRepository for MemoryStorage {
    async fn append(&self, record: &Record) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Record>> {
        let mut records = self.records.lock().clone();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn last_issued_id(&self) -> Result<u64> {
        Ok(*self.last_issued_id.lock())
    }

    async fn save_last_issued_id(&self, id: u64) -> Result<()> {
        let mut last = self.last_issued_id.lock();
        *last = (*last).max(id);
        Ok(())
    }

    fn repository_type(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl AuditRepository for MemoryStorage {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.audit.lock().push(entry.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<AuditEntry>> {
        Ok(self.audit.lock().clone())
    }
}
