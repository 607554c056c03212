//! 存储层模块
//!
//! 提供记录存储与数据持久化服务，支持内存存储和 SurrealDB。

pub mod factory;
pub mod memory;
pub mod record_store;
pub mod repository;

#[cfg(feature = "surrealdb")]
pub mod surrealdb;

pub use factory::{StorageFactory, StorageInstance};
pub use memory::MemoryStorage;
pub use record_store::RecordStore;
pub use repository::{AuditRepository, RecordRepository};
