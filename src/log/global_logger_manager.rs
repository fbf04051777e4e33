use crate::log::error::LogResult;
use crate::log::event::{Message, MetadataValue};
use crate::log::level::IntoLevel;
use crate::log::logger::Logger;
use crate::log::logger_manager::{LoggerManager, LoggerManagerConfig};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// 全局 LoggerManager 单例
///
/// 默认包含一个输出到标准输出、INFO 级别的文本 logger
static GLOBAL_LOGGER_MANAGER: Lazy<LoggerManager> = Lazy::new(|| {
    LoggerManager::new(LoggerManagerConfig::default()).unwrap_or_else(|err| {
        ::log::error!("failed to build default logger, falling back to a silent one: {}", err);
        LoggerManager::with_default(Logger::new("default"))
    })
});

/// 初始化全局 LoggerManager
///
/// 配置中的 logger 合并到全局单例，默认 logger 被替换
///
/// # 示例
///
/// ```ignore
/// let config: LoggerManagerConfig = json5::from_str(r#"{
///     default: { level: "info", adapters: [{ type: "StreamAdapter", options: {} }] },
///     loggers: { audit: { adapters: [{ type: "FileAdapter", options: { file_path: "audit.log" } }] } },
/// }"#)?;
/// logx::log::init(config)?;
/// ```
pub fn init(config: LoggerManagerConfig) -> LogResult<()> {
    let manager = LoggerManager::new(config)?;
    let default = manager.get_default();

    let loggers = std::mem::take(&mut *manager.write_loggers()?);
    GLOBAL_LOGGER_MANAGER.write_loggers()?.extend(loggers);
    GLOBAL_LOGGER_MANAGER.set_default(default)
}

/// 全局 LoggerManager
pub fn global_logger_manager() -> &'static LoggerManager {
    &GLOBAL_LOGGER_MANAGER
}

pub fn get(key: &str) -> Option<Arc<Logger>> {
    global_logger_manager().get(key)
}

/// 获取指定 key 的 logger，不存在时返回默认 logger
pub fn get_or_default(key: &str) -> Arc<Logger> {
    global_logger_manager().get_or_default(key)
}

pub fn get_default() -> Arc<Logger> {
    global_logger_manager().get_default()
}

pub fn set_default(logger: Arc<Logger>) -> LogResult<()> {
    global_logger_manager().set_default(logger)
}

pub fn add(key: impl Into<String>, logger: Logger) -> LogResult<Option<Arc<Logger>>> {
    global_logger_manager().add(key, logger)
}

pub fn contains(key: &str) -> bool {
    global_logger_manager().contains(key)
}

pub fn keys() -> Vec<String> {
    global_logger_manager().keys()
}

pub fn remove(key: &str) -> LogResult<Option<Arc<Logger>>> {
    global_logger_manager().remove(key)
}

// ========== 默认 logger 的便捷方法 ==========

pub fn write(level: impl IntoLevel, message: impl Into<Message>) -> LogResult<()> {
    get_default().write(level, message)
}

pub fn logm<K: Into<String>>(
    level: impl IntoLevel,
    message: impl Into<Message>,
    metadata: impl IntoIterator<Item = (K, MetadataValue)>,
) -> LogResult<()> {
    get_default().logm(level, message, metadata)
}

pub fn debug(message: impl Into<Message>) -> LogResult<()> {
    get_default().debug(message)
}

pub fn info(message: impl Into<Message>) -> LogResult<()> {
    get_default().info(message)
}

pub fn warn(message: impl Into<Message>) -> LogResult<()> {
    get_default().warn(message)
}

pub fn error(message: impl Into<Message>) -> LogResult<()> {
    get_default().error(message)
}

pub fn fatal(message: impl Into<Message>) -> LogResult<()> {
    get_default().fatal(message)
}
