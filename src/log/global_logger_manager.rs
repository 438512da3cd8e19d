use crate::log::logger_manager::{LoggerManager, LoggerManagerConfig};
use crate::log::Logger;
use anyhow::Result;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError};

/// 全局 LoggerManager 单例
///
/// 默认只有一个输出到终端的文本 logger
static GLOBAL_LOGGER_MANAGER: Lazy<Arc<LoggerManager>> =
    Lazy::new(|| Arc::new(LoggerManager::with_default(Arc::new(Logger::console()))));

/// 初始化全局 LoggerManager
///
/// 配置中的命名 logger 合并进全局单例，默认 logger 被替换
///
/// ```ignore
/// let config: LoggerManagerConfig = json5::from_str(r#"{
///     loggers: {
///         "app::service": { appender: { type: "FileAppender", options: { file_path: "logs/service.log" } } }
///     }
/// }"#)?;
/// rustx_apm::log::init_logger_manager(config)?;
/// ```
pub fn init_logger_manager(config: LoggerManagerConfig) -> Result<()> {
    let manager = LoggerManager::new(config)?;

    let loggers = manager
        .loggers
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    for (key, logger) in loggers.iter() {
        GLOBAL_LOGGER_MANAGER.add(key.clone(), Arc::clone(logger));
    }

    GLOBAL_LOGGER_MANAGER.set_default(manager.get_default());

    Ok(())
}

/// 获取全局 LoggerManager
pub fn global_logger_manager() -> Arc<LoggerManager> {
    Arc::clone(&GLOBAL_LOGGER_MANAGER)
}

/// 获取指定 key 的 logger（全局）
pub fn get(key: &str) -> Option<Arc<Logger>> {
    GLOBAL_LOGGER_MANAGER.get(key)
}

/// 按通道名解析 logger（全局）
pub fn resolve(channel: &str) -> Arc<Logger> {
    GLOBAL_LOGGER_MANAGER.resolve(channel)
}

/// 获取默认 logger（全局）
pub fn get_default_logger() -> Arc<Logger> {
    GLOBAL_LOGGER_MANAGER.get_default()
}

/// 动态添加 logger（全局）
pub fn add_logger(key: impl Into<String>, logger: Arc<Logger>) {
    GLOBAL_LOGGER_MANAGER.add(key, logger)
}

/// 移除 logger（全局）
pub fn remove_logger(key: &str) -> Option<Arc<Logger>> {
    GLOBAL_LOGGER_MANAGER.remove(key)
}
