use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};

use crate::config::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::audit::AuditEntry;
use crate::models::record::{FieldValue, Record};
use crate::storage::repository::{AuditRepository, RecordRepository};

const RECORD_TABLE: &str = "record";

/// SurrealDB 存储
#[derive(Clone)]
pub struct SurrealStorage {
    db: Surreal<Any>,
}

impl SurrealStorage {
    /// 连接数据库
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db: Surreal<Any> = connect(config.url.as_str()).await?;

        // 嵌入式引擎不需要登录
        if !config.username.is_empty() {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        Ok(Self { db })
    }
}

/// 记录行
///
/// Fields are stored as one JSON document string. Float columns holding
/// whole numbers come back as integers; the record store normalizes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordRow {
    record_id: u64,
    fields_json: String,
    source: Option<String>,
    uploaded_at: String,
}

impl RecordRow {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            record_id: record.id,
            fields_json: serde_json::to_string(&record.fields)?,
            source: record.source.clone(),
            uploaded_at: record.uploaded_at.to_rfc3339(),
        })
    }

    fn into_record(self) -> Result<Record> {
        let fields: BTreeMap<String, FieldValue> = serde_json::from_str(&self.fields_json)?;
        let uploaded_at = DateTime::parse_from_rfc3339(&self.uploaded_at)
            .map_err(|e| AppError::Serialization(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Record {
            id: self.record_id,
            fields,
            source: self.source,
            uploaded_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SequenceRow {
    last_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditRow {
    seq: u64,
    timestamp: String,
    method: String,
    path: String,
    status_code: u16,
    response_time_ms: f64,
}

#[async_trait]
impl RecordRepository for SurrealStorage {
    async fn append(&self, record: &Record) -> Result<()> {
        let row = RecordRow::from_record(record)?;
        let created: Option<RecordRow> = self
            .db
            .create((RECORD_TABLE, record.id as i64))
            .content(row)
            .await?;

        created
            .map(|_| ())
            .ok_or_else(|| AppError::Database(format!("Failed to create record: {}", record.id)))
    }

    async fn load_all(&self) -> Result<Vec<Record>> {
        let rows: Vec<RecordRow> = self
            .db
            .query("SELECT record_id, fields_json, source, uploaded_at FROM record ORDER BY record_id ASC")
            .await?
            .take(0)?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    async fn last_issued_id(&self) -> Result<u64> {
        let rows: Vec<SequenceRow> = self
            .db
            .query("SELECT last_id FROM sequence:record")
            .await?
            .take(0)?;

        Ok(rows.first().map(|r| r.last_id).unwrap_or(0))
    }

    async fn save_last_issued_id(&self, id: u64) -> Result<()> {
        self.db
            .query("UPSERT sequence:record SET last_id = $last_id")
            .bind(("last_id", id))
            .await?
            .check()?;
        Ok(())
    }

    fn repository_type(&self) -> &'static str {
        "surrealdb"
    }
}

#[async_trait]
impl AuditRepository for SurrealStorage {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let row = AuditRow {
            seq: entry.id,
            timestamp: entry.timestamp.to_rfc3339(),
            method: entry.method.clone(),
            path: entry.path.clone(),
            status_code: entry.status_code,
            response_time_ms: entry.response_time_ms,
        };

        self.db
            .query("CREATE audit_log CONTENT $row")
            .bind(("row", row))
            .await?
            .check()?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<AuditEntry>> {
        let rows: Vec<AuditRow> = self
            .db
            .query("SELECT seq, timestamp, method, path, status_code, response_time_ms FROM audit_log ORDER BY seq ASC")
            .await?
            .take(0)?;

        rows.into_iter()
            .map(|row| {
                let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
                    .map_err(|e| AppError::Serialization(e.to_string()))?
                    .with_timezone(&Utc);
                Ok(AuditEntry {
                    id: row.seq,
                    timestamp,
                    method: row.method,
                    path: row.path,
                    status_code: row.status_code,
                    response_time_ms: row.response_time_ms,
                })
            })
            .collect()
    }
}
