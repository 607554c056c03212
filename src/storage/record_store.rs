//! 记录存储
//!
//! 追加写入的记录表：写入经由仓储持久化，读取走内存快照。

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::record::{Record, RecordCandidate};
use crate::models::schema::Schema;
use crate::storage::memory::MemoryStorage;
use crate::storage::repository::RecordRepository;

#[derive(Default)]
struct Table {
    rows: Vec<Arc<Record>>,
    by_id: HashMap<u64, usize>,
}

impl Table {
    fn push(&mut self, record: Arc<Record>) {
        self.by_id.insert(record.id, self.rows.len());
        self.rows.push(record);
    }
}

/// 记录存储
///
/// Writers are serialized by `sequence`, which also holds the last issued
/// ID. Readers only ever see whole records.
pub struct RecordStore {
    schema: Arc<Schema>,
    table: RwLock<Table>,
    sequence: Mutex<u64>,
    repository: Arc<dyn RecordRepository>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("schema", &self.schema)
            .field("records", &self.len())
            .field("repository", &self.repository.repository_type())
            .finish()
    }
}

impl RecordStore {
    /// 打开存储并从仓储恢复已有记录
    pub async fn open(schema: Arc<Schema>, repository: Arc<dyn RecordRepository>) -> Result<Self> {
        let records = repository.load_all().await?;
        let last_issued = repository.last_issued_id().await?;

        let mut table = Table::default();
        let mut max_id = 0;
        for mut record in records {
            schema.normalize(&mut record.fields);
            max_id = max_id.max(record.id);
            table.push(Arc::new(record));
        }

        info!(
            "Record store opened: {} records, next id {} ({})",
            table.rows.len(),
            last_issued.max(max_id) + 1,
            repository.repository_type()
        );

        Ok(Self {
            schema,
            table: RwLock::new(table),
            sequence: Mutex::new(last_issued.max(max_id)),
            repository,
        })
    }

    /// 创建空的内存存储
    pub fn in_memory(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            table: RwLock::new(Table::default()),
            sequence: Mutex::new(0),
            repository: Arc::new(MemoryStorage::new()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 插入记录并分配下一个 ID
    pub async fn insert(&self, candidate: RecordCandidate, source: Option<&str>) -> Result<Record> {
        if !self.schema.matches_keys(candidate.fields.keys()) {
            let got: Vec<&str> = candidate.fields.keys().map(String::as_str).collect();
            return Err(AppError::Validation(format!(
                "record columns [{}] do not match the schema",
                got.join(", ")
            )));
        }

        let mut sequence = self.sequence.lock().await;
        let id = *sequence + 1;

        // 先持久化序列：即使写入记录失败，该 ID 也不会被重用
        self.repository.save_last_issued_id(id).await?;
        *sequence = id;

        let record = Record::new(id, candidate, source.map(str::to_string));
        self.repository.append(&record).await?;

        self.table.write().push(Arc::new(record.clone()));
        debug!("Inserted record {}", id);

        Ok(record)
    }

    /// 按插入顺序返回全部记录
    pub fn get_all(&self) -> Vec<Record> {
        self.table.read().rows.iter().map(|r| (**r).clone()).collect()
    }

    pub fn get_by_id(&self, id: u64) -> Result<Record> {
        let table = self.table.read();
        table
            .by_id
            .get(&id)
            .map(|&idx| (*table.rows[idx]).clone())
            .ok_or_else(|| AppError::NotFound(format!("Record not found: {}", id)))
    }

    /// 获取当前记录的一致快照
    pub fn snapshot(&self) -> Vec<Arc<Record>> {
        self.table.read().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::FieldValue;

    fn item(name: &str, price: f64) -> RecordCandidate {
        RecordCandidate::default()
            .with("name", name)
            .with("category", "produce")
            .with("quantity", 10_i64)
            .with("price", price)
            .with("location", "aisle3")
    }

    fn store() -> RecordStore {
        RecordStore::in_memory(Arc::new(Schema::default()))
    }

    #[tokio::test]
    async fn test_ids_are_sequential_from_one() {
        let store = store();
        let first = store.insert(item("apple", 1.5), None).await.unwrap();
        let second = store.insert(item("pear", 2.0), None).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, first.id + 1);
        assert_eq!(second.get("price"), Some(&FieldValue::Float(2.0)));
    }

    #[tokio::test]
    async fn test_read_your_write() {
        let store = store();
        let inserted = store
            .insert(item("apple", 1.5), Some("items.csv"))
            .await
            .unwrap();

        let fetched = store.get_by_id(inserted.id).unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.source.as_deref(), Some("items.csv"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let store = store();
        store.insert(item("apple", 1.5), None).await.unwrap();

        assert!(matches!(store.get_by_id(42), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_all_keeps_insertion_order() {
        let store = store();
        for name in ["cherry", "apple", "banana"] {
            store.insert(item(name, 1.0), None).await.unwrap();
        }

        let names: Vec<String> = store
            .get_all()
            .iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["cherry", "apple", "banana"]);
    }

    #[tokio::test]
    async fn test_rejects_schema_drift() {
        let store = store();
        let drifted = item("apple", 1.5).with("warehouse", "north");

        let result = store.insert(drifted, None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.is_empty());

        let mut missing = item("apple", 1.5);
        missing.fields.remove("location");
        assert!(store.insert(missing, None).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_unique_ids() {
        let store = Arc::new(store());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(item(&format!("item{}", i), i as f64), None)
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=50).collect::<Vec<u64>>());
        assert_eq!(store.len(), 50);

        let stored: Vec<u64> = store.get_all().iter().map(|r| r.id).collect();
        assert!(stored.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_reopen_continues_sequence() {
        let storage = Arc::new(MemoryStorage::new());
        let schema = Arc::new(Schema::default());

        let store = RecordStore::open(schema.clone(), storage.clone()).await.unwrap();
        store.insert(item("apple", 1.5), None).await.unwrap();
        store.insert(item("pear", 2.0), None).await.unwrap();

        let reopened = RecordStore::open(schema.clone(), storage.clone()).await.unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get_by_id(1).unwrap().get("name").unwrap().to_string(), "apple");

        storage.clear_records();
        let cleared = RecordStore::open(schema, storage).await.unwrap();
        assert!(cleared.is_empty());
        let next = cleared.insert(item("plum", 3.0), None).await.unwrap();
        assert_eq!(next.id, 3);
    }
}
