use crate::config::config::{AppConfig, StorageBackendType};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::collections::HashSet;
use std::path::PathBuf;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序：
    /// 1. 内置开发环境默认值
    /// 2. ./tabquery.toml
    /// 3. 环境变量（TABQUERY_ 前缀，`__` 分隔层级）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        Self::figment(path).extract()
    }

    fn figment(path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("TABQUERY_").split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.database.backend == StorageBackendType::SurrealDB
            && config.database.url.is_empty()
        {
            return Err(ConfigValidationError::MissingDatabaseUrl);
        }

        if config.security.username.is_empty() || config.security.password_sha256.is_empty() {
            return Err(ConfigValidationError::MissingCredentials);
        }

        let schema = config
            .schema
            .build()
            .map_err(|e| ConfigValidationError::InvalidSchema(e.to_string()))?;

        let mut intents = HashSet::new();
        for rule in &config.query.intents {
            if !schema.contains(&rule.column) {
                return Err(ConfigValidationError::UnknownIntentColumn(rule.column.clone()));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigValidationError::EmptyIntentKeywords(
                    rule.intent.to_string(),
                ));
            }
            if !intents.insert(rule.intent) {
                return Err(ConfigValidationError::DuplicateIntent(rule.intent.to_string()));
            }
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("数据库连接 URL 未配置")]
    MissingDatabaseUrl,

    #[error("认证用户名或密码摘要未配置")]
    MissingCredentials,

    #[error("表结构无效: {0}")]
    InvalidSchema(String),

    #[error("意图映射的列不存在: {0}")]
    UnknownIntentColumn(String),

    #[error("意图没有关键词: {0}")]
    EmptyIntentKeywords(String),

    #[error("意图重复定义: {0}")]
    DuplicateIntent(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("tabquery.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::IntentRule;
    use crate::models::query::AttributeIntent;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::load_from(PathBuf::from("does-not-exist.toml")).unwrap();
        assert_eq!(config.app_name, "tabquery");
        assert_eq!(config.schema.identifier, "name");
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut config = AppConfig::development();
        config.server.port = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidPort)
        ));
    }

    #[test]
    fn test_validate_rejects_intent_on_unknown_column() {
        let mut config = AppConfig::development();
        config.query.intents.push(IntentRule::new(
            AttributeIntent::Unknown,
            &["stock"],
            "stock",
        ));
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::UnknownIntentColumn(c)) if c == "stock"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_identifier() {
        let mut config = AppConfig::development();
        config.schema.identifier = "sku".into();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidSchema(_))
        ));
    }
}
