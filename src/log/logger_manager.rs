use crate::cfg::TypeOptions;
use crate::log::error::{LogError, LogResult};
use crate::log::level::Level;
use crate::log::logger::{Logger, LoggerConfig};
use serde::Deserialize;
use smart_default::SmartDefault;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 默认 logger 配置：标准输出，INFO 级别
pub fn default_logger_config() -> LoggerConfig {
    LoggerConfig {
        name: Some("default".to_string()),
        level: Level::Info,
        adapters: vec![TypeOptions::new(
            "StreamAdapter",
            serde_json::json!({ "target": "stdout" }),
        )],
        ..Default::default()
    }
}

/// Logger Manager 配置
///
/// 用于统一管理多个 Logger 实例
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct LoggerManagerConfig {
    /// 默认 logger 配置
    #[default(default_logger_config())]
    pub default: LoggerConfig,

    /// 命名 logger 配置，未设置 name 时使用 key
    pub loggers: HashMap<String, LoggerConfig>,
}

/// Logger 管理器
pub struct LoggerManager {
    pub(crate) loggers: RwLock<HashMap<String, Arc<Logger>>>,
    default: RwLock<Arc<Logger>>,
}

impl LoggerManager {
    /// 从配置创建 LoggerManager
    pub fn new(config: LoggerManagerConfig) -> LogResult<Self> {
        let mut loggers = HashMap::new();
        for (key, mut logger_config) in config.loggers {
            if logger_config.name.is_none() {
                logger_config.name = Some(key.clone());
            }
            loggers.insert(key, Arc::new(Logger::from_config(logger_config)?));
        }

        let default = Arc::new(Logger::from_config(config.default)?);

        Ok(Self {
            loggers: RwLock::new(loggers),
            default: RwLock::new(default),
        })
    }

    /// 只有默认 logger 的管理器
    pub fn with_default(default: Logger) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            default: RwLock::new(Arc::new(default)),
        }
    }

    /// 获取指定 key 的 logger
    pub fn get(&self, key: &str) -> Option<Arc<Logger>> {
        self.loggers.read().ok()?.get(key).cloned()
    }

    /// 获取指定 key 的 logger，不存在时返回默认 logger
    pub fn get_or_default(&self, key: &str) -> Arc<Logger> {
        self.get(key).unwrap_or_else(|| self.get_default())
    }

    pub fn get_default(&self) -> Arc<Logger> {
        match self.default.read() {
            Ok(default) => Arc::clone(&default),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn set_default(&self, logger: Arc<Logger>) -> LogResult<()> {
        *self
            .default
            .write()
            .map_err(|_| LogError::LockPoisoned("default logger".to_string()))? = logger;
        Ok(())
    }

    /// 添加 logger，已存在时替换并返回旧的
    pub fn add(&self, key: impl Into<String>, logger: Logger) -> LogResult<Option<Arc<Logger>>> {
        Ok(self.write_loggers()?.insert(key.into(), Arc::new(logger)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.loggers
            .read()
            .map(|loggers| loggers.contains_key(key))
            .unwrap_or(false)
    }

    /// 所有 logger 的 key（排序后）
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .loggers
            .read()
            .map(|loggers| loggers.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn remove(&self, key: &str) -> LogResult<Option<Arc<Logger>>> {
        Ok(self.write_loggers()?.remove(key))
    }

    pub(crate) fn write_loggers(
        &self,
    ) -> LogResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Logger>>>> {
        self.loggers
            .write()
            .map_err(|_| LogError::LockPoisoned("logger manager".to_string()))
    }
}
