use crate::cfg::TypeOptions;
use crate::log::appender::{create_appender_from_options, ConsoleAppender, ConsoleAppenderConfig};
use crate::log::formatter::{create_formatter_from_options, TextFormatter, TextFormatterConfig};
use crate::log::{LogAppender, LogFormatter, LogLevel, LogRecord};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use smart_default::SmartDefault;
use std::sync::{Arc, Once, PoisonError, RwLock};

/// Logger 创建配置（用于创建新的 Logger 实例）
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LoggerCreateConfig {
    /// 日志级别
    #[default = "info"]
    pub level: String,

    /// Formatter 配置
    #[default(TypeOptions::of("TextFormatter"))]
    pub formatter: TypeOptions,

    /// Appender 配置
    #[default(TypeOptions::of("ConsoleAppender"))]
    pub appender: TypeOptions,
}

/// Logger 配置
///
/// 支持两种模式：
/// - Reference: 引用全局 LoggerManager 中已存在的 logger（通过 $instance 字段）
/// - Create: 创建新的 logger 实例
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LoggerConfig {
    Reference {
        #[serde(rename = "$instance")]
        instance: String,
    },

    Create(LoggerCreateConfig),
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig::Create(LoggerCreateConfig::default())
    }
}

static REGISTER_ONCE: Once = Once::new();

/// 核心日志器
///
/// 负责级别过滤、格式化和输出，全部在调用线程内同步完成
pub struct Logger {
    level: RwLock<LogLevel>,
    formatter: Arc<dyn LogFormatter>,
    appender: Arc<dyn LogAppender>,
}

impl Logger {
    /// 从创建配置创建 Logger
    pub fn new(config: LoggerCreateConfig) -> Result<Self> {
        REGISTER_ONCE.call_once(|| {
            let _ = crate::log::register_formatters();
            let _ = crate::log::register_appenders();
        });

        let level = config
            .level
            .parse::<LogLevel>()
            .map_err(|e| anyhow!(e))?;
        let formatter: Arc<dyn LogFormatter> =
            Arc::from(create_formatter_from_options(&config.formatter)?);
        let appender: Arc<dyn LogAppender> =
            Arc::from(create_appender_from_options(&config.appender)?);

        Ok(Self::with_parts(level, formatter, appender))
    }

    /// 直接用组件构造 Logger
    pub fn with_parts(
        level: LogLevel,
        formatter: Arc<dyn LogFormatter>,
        appender: Arc<dyn LogAppender>,
    ) -> Self {
        Self {
            level: RwLock::new(level),
            formatter,
            appender,
        }
    }

    /// 输出到 stdout 的 INFO 级文本 logger，不经过注册表
    pub fn console() -> Self {
        Self::with_parts(
            LogLevel::Info,
            Arc::new(TextFormatter::new(TextFormatterConfig::default())),
            Arc::new(ConsoleAppender::new(ConsoleAppenderConfig::default())),
        )
    }

    /// 从配置解析 Logger
    ///
    /// Reference 模式从全局 LoggerManager 获取，Create 模式新建
    pub fn resolve(config: LoggerConfig) -> Result<Arc<Self>> {
        match config {
            LoggerConfig::Reference { instance } => crate::log::get(&instance).ok_or_else(|| {
                anyhow!("Logger instance '{}' not found in global manager", instance)
            }),
            LoggerConfig::Create(create_config) => Ok(Arc::new(Logger::new(create_config)?)),
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }

    pub fn level(&self) -> LogLevel {
        *self.level.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// 记录日志，低于当前级别的记录直接丢弃
    pub fn log(&self, record: LogRecord) -> Result<()> {
        if !self.is_enabled(record.level) {
            return Ok(());
        }

        let formatted = self.formatter.format(&record)?;
        self.appender.append(&formatted)
    }

    pub fn info(&self, logger: impl Into<String>, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Info, logger, message))
    }

    pub fn warn(&self, logger: impl Into<String>, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Warn, logger, message))
    }

    pub fn flush(&self) -> Result<()> {
        self.appender.flush()
    }
}
