use crate::config::config::{AppConfig, QueryConfig};
use crate::error::Result;
use crate::observability::AppMetrics;
use crate::security::auth::{CredentialVerifier, StaticCredentialVerifier};
use crate::services::audit_log::AuditLog;
use crate::services::ingestion::IngestionValidator;
use crate::services::query_engine::QueryEngine;
use crate::services::upload::UploadService;
use crate::storage::factory::StorageInstance;
use crate::storage::record_store::RecordStore;
use std::sync::Arc;

/// Application state containing all shared services and security components
#[derive(Clone)]
pub struct AppState {
    /// Append-only record store
    pub record_store: Arc<RecordStore>,
    /// Validates uploads and writes the valid rows
    pub upload_service: Arc<UploadService>,
    /// Rule-based question answering over the record store
    pub query_engine: Arc<QueryEngine>,
    /// API request log
    pub audit_log: Arc<AuditLog>,
    /// Credential check for protected routes
    pub credential_verifier: Arc<dyn CredentialVerifier>,
    /// Request and domain counters
    pub metrics: Arc<AppMetrics>,
    /// Upload body limit in bytes
    pub max_upload_size: usize,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("record_store", &self.record_store)
            .field("upload_service", &"Arc<UploadService>")
            .field("query_engine", &"Arc<QueryEngine>")
            .field("audit_log", &"Arc<AuditLog>")
            .field("credential_verifier", &"Arc<dyn CredentialVerifier>")
            .field("max_upload_size", &self.max_upload_size)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        record_store: Arc<RecordStore>,
        audit_log: Arc<AuditLog>,
        query_config: &QueryConfig,
        credential_verifier: Box<dyn CredentialVerifier>,
        max_upload_size: usize,
    ) -> Result<Self> {
        let validator = IngestionValidator::new(Arc::new(record_store.schema().clone()));
        let upload_service = UploadService::new(validator, record_store.clone());
        let query_engine = QueryEngine::new(query_config, record_store.clone())?;

        Ok(Self {
            record_store,
            upload_service: Arc::new(upload_service),
            query_engine: Arc::new(query_engine),
            audit_log,
            credential_verifier: Arc::from(credential_verifier),
            metrics: Arc::new(AppMetrics::default()),
            max_upload_size,
        })
    }

    /// Build application state on top of a storage instance
    pub async fn from_config(config: &AppConfig, storage: &StorageInstance) -> Result<Self> {
        let schema = Arc::new(config.schema.build()?);
        let record_store = RecordStore::open(schema, storage.record_repository()).await?;
        let audit_log = AuditLog::open(storage.audit_repository()).await?;

        Self::new(
            Arc::new(record_store),
            Arc::new(audit_log),
            &config.query,
            Box::new(StaticCredentialVerifier::from_settings(&config.security)),
            config.server.max_request_size,
        )
    }

    /// Create development application state backed by memory only
    pub fn development(config: &AppConfig) -> Result<Self> {
        let schema = Arc::new(config.schema.build()?);

        Self::new(
            Arc::new(RecordStore::in_memory(schema)),
            Arc::new(AuditLog::in_memory()),
            &config.query,
            Box::new(StaticCredentialVerifier::from_settings(&config.security)),
            config.server.max_request_size,
        )
    }
}
