use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API 访问日志条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 日志序号（从 1 开始）
    pub id: u64,
    /// 请求时间
    pub timestamp: DateTime<Utc>,
    /// HTTP 方法
    pub method: String,
    /// 请求路径
    pub path: String,
    /// 响应状态码
    pub status_code: u16,
    /// 响应耗时（毫秒）
    pub response_time_ms: f64,
}
