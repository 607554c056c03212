//! 可观测性模块
//!
//! 提供 Prometheus 指标、结构化日志、访问日志中间件和健康检查。

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::api::app_state::AppState;
use crate::config::config::LoggingConfig;

// ===== Simple Metrics =====

/// 简单应用指标
#[derive(Default)]
pub struct AppMetrics {
    pub http_requests_total: AtomicU64,
    pub http_request_duration_sum: AtomicU64,
    pub rows_ingested_total: AtomicU64,
    pub rows_rejected_total: AtomicU64,
    pub questions_total: AtomicU64,
    pub questions_matched_total: AtomicU64,
    pub errors_total: AtomicU64,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64, status: u16) {
        self.http_requests_total.fetch_add(1, Ordering::SeqCst);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
        if status >= 500 {
            self.errors_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 记录上传结果
    pub fn record_upload(&self, inserted: usize, rejected: usize) {
        self.rows_ingested_total
            .fetch_add(inserted as u64, Ordering::SeqCst);
        self.rows_rejected_total
            .fetch_add(rejected as u64, Ordering::SeqCst);
    }

    /// 记录问答
    pub fn record_question(&self, matched: bool) {
        self.questions_total.fetch_add(1, Ordering::SeqCst);
        if matched {
            self.questions_matched_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP rows_ingested_total Rows stored from uploads
# TYPE rows_ingested_total counter
rows_ingested_total {}
# HELP rows_rejected_total Upload rows rejected by validation
# TYPE rows_rejected_total counter
rows_rejected_total {}
# HELP questions_total Questions asked
# TYPE questions_total counter
questions_total {}
# HELP questions_matched_total Questions answered from stored data
# TYPE questions_matched_total counter
questions_matched_total {}
# HELP errors_total Responses with a server error status
# TYPE errors_total counter
errors_total {}
"#,
            self.http_requests_total.load(Ordering::SeqCst),
            self.http_request_duration_sum.load(Ordering::SeqCst) as f64 / 1000.0,
            self.http_requests_total.load(Ordering::SeqCst),
            self.rows_ingested_total.load(Ordering::SeqCst),
            self.rows_rejected_total.load(Ordering::SeqCst),
            self.questions_total.load(Ordering::SeqCst),
            self.questions_matched_total.load(Ordering::SeqCst),
            self.errors_total.load(Ordering::SeqCst),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
}

/// 健康检查结果
#[derive(Clone)]
pub struct HealthCheckResult {
    pub name: String,
    pub healthy: bool,
    pub message: String,
    pub latency_ms: u64,
}

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub health_checks: Arc<Mutex<Vec<HealthCheckResult>>>,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: Arc<AppMetrics>) -> Self {
        Self {
            metrics,
            health_checks: Arc::new(Mutex::new(Vec::new())),
            start_time: Utc::now(),
            version,
        }
    }

    /// 添加健康检查结果
    pub async fn add_health_check(&self, result: HealthCheckResult) {
        let mut checks = self.health_checks.lock().await;
        checks.retain(|c| c.name != result.name);
        checks.push(result);
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

fn status_label(healthy: bool) -> String {
    let label = if healthy { "healthy" } else { "unhealthy" };
    label.to_string()
}

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    let health_status = HealthStatus {
        status: status_label(all_healthy),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks: checks
            .iter()
            .map(|c| HealthCheck {
                name: c.name.clone(),
                status: status_label(c.healthy),
                message: Some(c.message.clone()),
                latency_ms: Some(c.latency_ms),
            })
            .collect(),
    };

    let status_code = if all_healthy {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;

    if checks.iter().all(|c| c.healthy) {
        (axum::http::StatusCode::OK, "Ready")
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    state.metrics.gather()
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化日志
///
/// `RUST_LOG` overrides the configured level. When a log directory is set
/// the returned guard must be kept alive to flush the file writer.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if let Some(dir) = &config.log_dir {
        let appender = tracing_appender::rolling::daily(dir, "tabquery.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .with_writer(writer)
            .try_init();
        return Some(guard);
    }

    if config.structured {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_line_number(true)
            .try_init();
    }

    None
}

// ===== Audit Middleware =====

/// 访问日志中间件
///
/// Records method, path, status and latency for every request.
pub async fn audit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    state
        .metrics
        .record_http_request(elapsed.as_millis() as u64, status);
    state
        .audit_log
        .record(&method, &path, status, elapsed.as_secs_f64() * 1000.0)
        .await;

    response
}
