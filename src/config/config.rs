use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::query::AttributeIntent;
use crate::models::schema::{ColumnSpec, ColumnType, Schema};

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendType {
    /// 进程内存储（重启后丢失）
    #[default]
    Memory,
    /// SurrealDB 持久化存储
    SurrealDB,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 存储后端
    pub backend: StorageBackendType,
    /// SurrealDB 连接地址，例如 rocksdb://./data/tabquery.db
    pub url: String,
    /// 命名空间
    pub namespace: String,
    /// 数据库名称
    pub database: String,
    /// 用户名（为空时跳过登录，适用于嵌入式引擎）
    pub username: String,
    /// 密码
    pub password: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

/// 安全配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Basic 认证用户名
    pub username: String,
    /// 密码的 SHA-256 十六进制摘要
    pub password_sha256: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录（按天滚动）
    pub log_dir: Option<PathBuf>,
}

/// 表结构配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// 必需列及其类型
    pub columns: Vec<ColumnSpec>,
    /// 主标识列
    pub identifier: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        let schema = Schema::default();
        Self {
            columns: schema.columns().to_vec(),
            identifier: schema.identifier().to_string(),
        }
    }
}

impl SchemaConfig {
    pub fn build(&self) -> Result<Schema> {
        Schema::new(self.columns.clone(), &self.identifier)
    }
}

/// 意图规则：关键词集合 → 意图 → 目标列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: AttributeIntent,
    /// 关键词，可以是多个单词组成的短语
    pub keywords: Vec<String>,
    pub column: String,
}

impl IntentRule {
    pub fn new(intent: AttributeIntent, keywords: &[&str], column: &str) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            column: column.to_string(),
        }
    }
}

/// 问答引擎配置
///
/// `intents` is evaluated in list order when two rules hit the same token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub stop_words: Vec<String>,
    pub intents: Vec<IntentRule>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stop_words: ["what", "is", "the", "of", "give", "me", "where", "located"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            intents: vec![
                IntentRule::new(AttributeIntent::Price, &["price", "cost"], "price"),
                IntentRule::new(
                    AttributeIntent::Quantity,
                    &["quantity", "qty", "how many"],
                    "quantity",
                ),
                IntentRule::new(AttributeIntent::Location, &["location", "where"], "location"),
            ],
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 服务器配置
    pub server: ServerConfig,
    /// 安全配置
    pub security: SecurityConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 表结构配置
    pub schema: SchemaConfig,
    /// 问答引擎配置
    pub query: QueryConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                backend: StorageBackendType::Memory,
                url: "rocksdb://./data/tabquery.db".into(),
                namespace: "tabquery".into(),
                database: "uploads".into(),
                username: String::new(),
                password: String::new(),
            },
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
                max_request_size: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                username: "admin".into(),
                // sha256("password")
                password_sha256: "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
                    .into(),
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            schema: SchemaConfig::default(),
            query: QueryConfig::default(),
            app_name: "tabquery".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config.database.backend = StorageBackendType::SurrealDB;
        config
    }
}
