use crate::log::logger::LoggerConfig;
use crate::log::Logger;
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Logger Manager 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct LoggerManagerConfig {
    /// 默认 logger（未配置时输出到终端）
    pub default: LoggerConfig,

    /// 命名 logger，key 为通道名或其前缀（`app::service` / `app::service::UserService`）
    pub loggers: HashMap<String, LoggerConfig>,
}

/// Logger 管理器
///
/// 维护默认 logger 和按名称注册的 logger，并负责把日志通道路由到 logger
pub struct LoggerManager {
    pub(crate) loggers: RwLock<HashMap<String, Arc<Logger>>>,
    default: RwLock<Arc<Logger>>,
}

impl LoggerManager {
    /// 从配置创建 LoggerManager
    pub fn new(config: LoggerManagerConfig) -> Result<Self> {
        let mut loggers_map = HashMap::new();
        let mut reference_configs: Vec<(String, String)> = Vec::new();

        // 先创建所有 Create 模式的 logger，Reference 留到第二轮解析
        for (key, logger_config) in config.loggers {
            match logger_config {
                LoggerConfig::Reference { instance } => reference_configs.push((key, instance)),
                LoggerConfig::Create(create_config) => {
                    loggers_map.insert(key, Arc::new(Logger::new(create_config)?));
                }
            }
        }

        for (key, instance) in reference_configs {
            let logger = Self::resolve_logger_config_by_name(&instance, &loggers_map)?;
            loggers_map.insert(key, logger);
        }

        let default_logger = match config.default {
            LoggerConfig::Reference { instance } => {
                Self::resolve_logger_config_by_name(&instance, &loggers_map)?
            }
            LoggerConfig::Create(create_config) => Arc::new(Logger::new(create_config)?),
        };

        Ok(Self {
            loggers: RwLock::new(loggers_map),
            default: RwLock::new(default_logger),
        })
    }

    /// 只有默认 logger 的管理器
    pub fn with_default(default: Arc<Logger>) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            default: RwLock::new(default),
        }
    }

    fn resolve_logger_config_by_name(
        instance: &str,
        created_loggers: &HashMap<String, Arc<Logger>>,
    ) -> Result<Arc<Logger>> {
        if let Some(logger) = created_loggers.get(instance) {
            return Ok(Arc::clone(logger));
        }

        if let Some(logger) = crate::log::get(instance) {
            return Ok(logger);
        }

        Err(anyhow::anyhow!(
            "Logger instance '{}' not found (neither in current config nor in global manager)",
            instance
        ))
    }

    /// 获取指定 key 的 logger
    pub fn get(&self, key: &str) -> Option<Arc<Logger>> {
        let loggers = self.loggers.read().unwrap_or_else(PoisonError::into_inner);
        loggers.get(key).cloned()
    }

    /// 按通道名解析 logger
    ///
    /// 依次尝试：完整通道名 `a::b::Type#method`、类型名 `a::b::Type`、
    /// 逐级父路径 `a::b`、`a`，都没有则返回默认 logger
    pub fn resolve(&self, channel: &str) -> Arc<Logger> {
        let loggers = self.loggers.read().unwrap_or_else(PoisonError::into_inner);
        if !loggers.is_empty() {
            let mut name = channel;
            loop {
                if let Some(logger) = loggers.get(name) {
                    return Arc::clone(logger);
                }
                match parent_channel(name) {
                    Some(parent) => name = parent,
                    None => break,
                }
            }
        }
        drop(loggers);

        self.get_default()
    }

    pub fn get_default(&self) -> Arc<Logger> {
        let default = self.default.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&default)
    }

    pub fn set_default(&self, logger: Arc<Logger>) {
        *self.default.write().unwrap_or_else(PoisonError::into_inner) = logger;
    }

    /// 动态添加 logger
    pub fn add(&self, key: impl Into<String>, logger: Arc<Logger>) {
        let mut loggers = self.loggers.write().unwrap_or_else(PoisonError::into_inner);
        loggers.insert(key.into(), logger);
    }

    pub fn remove(&self, key: &str) -> Option<Arc<Logger>> {
        let mut loggers = self.loggers.write().unwrap_or_else(PoisonError::into_inner);
        loggers.remove(key)
    }
}

/// `a::b::Type#method` -> `a::b::Type` -> `a::b` -> `a` -> None
fn parent_channel(name: &str) -> Option<&str> {
    if let Some((type_name, _)) = name.rsplit_once('#') {
        return Some(type_name);
    }
    name.rsplit_once("::").map(|(parent, _)| parent)
}
