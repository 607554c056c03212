//! API 访问日志服务

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::Result;
use crate::models::audit::AuditEntry;
use crate::storage::memory::MemoryStorage;
use crate::storage::repository::AuditRepository;

/// 访问日志
///
/// Persistence failures are logged and swallowed; auditing never fails a
/// request.
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
    sequence: Mutex<u64>,
    repository: Arc<dyn AuditRepository>,
}

impl AuditLog {
    /// 打开日志并加载已有条目
    pub async fn open(repository: Arc<dyn AuditRepository>) -> Result<Self> {
        let entries = repository.load_all().await?;
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);

        Ok(Self {
            entries: RwLock::new(entries),
            sequence: Mutex::new(last_id),
            repository,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            sequence: Mutex::new(0),
            repository: Arc::new(MemoryStorage::new()),
        }
    }

    /// 记录一次请求
    pub async fn record(
        &self,
        method: &str,
        path: &str,
        status_code: u16,
        response_time_ms: f64,
    ) -> AuditEntry {
        let mut sequence = self.sequence.lock().await;
        *sequence += 1;

        let entry = AuditEntry {
            id: *sequence,
            timestamp: Utc::now(),
            method: method.to_string(),
            path: path.to_string(),
            status_code,
            response_time_ms,
        };

        if let Err(e) = self.repository.append(&entry).await {
            warn!("Failed to persist audit entry {}: {}", entry.id, e);
        }
        self.entries.write().push(entry.clone());

        entry
    }

    /// 返回全部日志（最新在前）
    pub fn list(&self) -> Vec<AuditEntry> {
        self.entries.read().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
