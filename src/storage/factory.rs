//! 存储工厂模块
//!
//! 根据配置创建相应的存储实例。

use crate::config::config::{DatabaseConfig, StorageBackendType};
use crate::error::{AppError, Result};
use crate::storage::memory::MemoryStorage;
use crate::storage::repository::{AuditRepository, RecordRepository};
use std::sync::Arc;

#[cfg(feature = "surrealdb")]
use crate::storage::surrealdb::SurrealStorage;

/// 存储实例枚举
#[derive(Clone)]
pub enum StorageInstance {
    Memory(Arc<MemoryStorage>),
    #[cfg(feature = "surrealdb")]
    SurrealDB(Arc<SurrealStorage>),
}

/// 存储工厂
pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置创建存储实例
    pub async fn create(config: &DatabaseConfig) -> Result<StorageInstance> {
        match config.backend {
            StorageBackendType::Memory => Ok(StorageInstance::Memory(Arc::new(MemoryStorage::new()))),
            #[cfg(feature = "surrealdb")]
            StorageBackendType::SurrealDB => {
                let storage = SurrealStorage::connect(config).await?;
                Ok(StorageInstance::SurrealDB(Arc::new(storage)))
            }
            #[cfg(not(feature = "surrealdb"))]
            StorageBackendType::SurrealDB => Err(AppError::Config(
                "SurrealDB feature is not enabled. Enable 'surrealdb' feature to use SurrealDB."
                    .into(),
            )),
        }
    }
}

impl StorageInstance {
    pub fn record_repository(&self) -> Arc<dyn RecordRepository> {
        match self {
            StorageInstance::Memory(storage) => storage.clone(),
            #[cfg(feature = "surrealdb")]
            StorageInstance::SurrealDB(storage) => storage.clone(),
        }
    }

    pub fn audit_repository(&self) -> Arc<dyn AuditRepository> {
        match self {
            StorageInstance::Memory(storage) => storage.clone(),
            #[cfg(feature = "surrealdb")]
            StorageInstance::SurrealDB(storage) => storage.clone(),
        }
    }

    /// 检查存储是否可用
    pub async fn health_check(&self) -> Result<bool> {
        self.record_repository()
            .last_issued_id()
            .await
            .map(|_| true)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
