use crate::log::formatter::LogFormatter;
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use smart_default::SmartDefault;
use std::fmt::Write;

/// TextFormatter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct TextFormatterConfig {
    /// 是否启用颜色输出
    #[default = false]
    pub colored: bool,

    /// chrono 时间格式
    #[default = "%Y-%m-%d %H:%M:%S%.3f"]
    pub time_format: String,
}

/// 文本格式化器
///
/// 输出格式：`2025-01-19 12:34:56.789 [main] INFO  [app::UserService#get] - {"start":...}`，
/// 设置了链路上下文时在通道名后追加 `[traceId,spanId]`
pub struct TextFormatter {
    config: TextFormatterConfig,
}

impl TextFormatter {
    pub fn new(config: TextFormatterConfig) -> Self {
        Self { config }
    }

    fn level(&self, level: LogLevel) -> ColoredString {
        let padded = format!("{:<5}", level);
        if !self.config.colored {
            return padded.normal();
        }
        match level {
            LogLevel::Error => padded.red(),
            LogLevel::Warn => padded.yellow(),
            LogLevel::Info => padded.green(),
            LogLevel::Debug => padded.cyan(),
            LogLevel::Trace => padded.dimmed(),
        }
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut line = String::with_capacity(64 + record.logger.len() + record.message.len());

        let timestamp = record
            .timestamp
            .with_timezone(&chrono::Local)
            .format(&self.config.time_format)
            .to_string();
        let (timestamp, thread, logger) = if self.config.colored {
            (
                timestamp.dimmed(),
                record.thread.as_str().dimmed(),
                record.logger.as_str().cyan(),
            )
        } else {
            (
                timestamp.normal(),
                record.thread.as_str().normal(),
                record.logger.as_str().normal(),
            )
        };

        write!(
            line,
            "{} [{}] {} [{}]",
            timestamp,
            thread,
            self.level(record.level),
            logger,
        )?;
        if let Some(trace) = &record.trace {
            write!(line, " [{},{}]", trace.trace_id, trace.span_id)?;
        }
        write!(line, " - {}", record.message)?;

        Ok(line)
    }
}

crate::impl_from!(TextFormatterConfig => TextFormatter);
crate::impl_box_from!(TextFormatter => dyn LogFormatter);
