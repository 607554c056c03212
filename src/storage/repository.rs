use async_trait::async_trait;

use crate::error::Result;
use crate::models::audit::AuditEntry;
use crate::models::record::Record;

/// 记录仓储 trait
///
/// The last issued ID is kept apart from the record table so a cleared
/// table never hands out an old ID again.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 追加记录
    async fn append(&self, record: &Record) -> Result<()>;

    /// 按 ID 升序加载全部记录
    async fn load_all(&self) -> Result<Vec<Record>>;

    /// 读取已分配的最大 ID（从未分配时为 0）
    async fn last_issued_id(&self) -> Result<u64>;

    /// 持久化已分配的最大 ID
    async fn save_last_issued_id(&self, id: u64) -> Result<()>;

    /// 仓储类型
    fn repository_type(&self) -> &'static str;
}

/// 访问日志仓储 trait
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// 追加日志
    async fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// 按写入顺序加载全部日志
    async fn load_all(&self) -> Result<Vec<AuditEntry>>;
}
