use crate::log::record::LogRecord;
use anyhow::Result;

/// 日志格式化器 trait
///
/// 负责将 LogRecord 格式化为一行文本（不含换行符）
pub trait LogFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<String>;
}
