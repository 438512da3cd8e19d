use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::log::context::{current_trace, TraceContext};
use crate::log::level::LogLevel;

/// 日志记录
///
/// `logger` 是日志通道名，方法监控中为 `类型#方法`；
/// `trace` 取自创建时线程上的链路上下文
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger: String,
    pub thread: String,
    pub message: String,
    #[serde(flatten)]
    pub trace: Option<TraceContext>,
}

impl LogRecord {
    /// 创建新的日志记录，时间戳和线程取当前值
    pub fn new(level: LogLevel, logger: impl Into<String>, message: impl Into<String>) -> Self {
        let current = std::thread::current();
        let thread = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };

        Self {
            timestamp: Utc::now(),
            level,
            logger: logger.into(),
            thread,
            message: message.into(),
            trace: current_trace(),
        }
    }
}
