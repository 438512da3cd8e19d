use crate::log::{LogLevel, LogRecord, Logger};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 日志输出端
pub trait LogSink: Send + Sync {
    fn write(&self, channel: &str, level: LogLevel, message: &str) -> Result<()>;
}

/// 通过全局 LoggerManager 按通道名路由
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedSink;

impl LogSink for ManagedSink {
    fn write(&self, channel: &str, level: LogLevel, message: &str) -> Result<()> {
        crate::log::resolve(channel).log(LogRecord::new(level, channel, message))
    }
}

/// 所有通道写到同一个 logger
pub struct LoggerSink {
    logger: Arc<Logger>,
}

impl LoggerSink {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl LogSink for LoggerSink {
    fn write(&self, channel: &str, level: LogLevel, message: &str) -> Result<()> {
        self.logger.log(LogRecord::new(level, channel, message))
    }
}

/// 把格式化好的监控记录写到 INFO 级别
///
/// 输出失败不会影响被监控的方法：第一次失败在 stderr 上提示一次，之后静默丢弃
pub struct Emitter {
    sink: Arc<dyn LogSink>,
    warned: AtomicBool,
}

impl Emitter {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            warned: AtomicBool::new(false),
        }
    }

    pub fn emit(&self, channel: &str, message: &str) {
        if let Err(e) = self.sink.write(channel, LogLevel::Info, message) {
            if !self.warned.swap(true, Ordering::Relaxed) {
                eprintln!(
                    "[rustx-apm] failed to write monitor log to '{}': {:?}",
                    channel, e
                );
            }
        }
    }

    pub fn has_warned(&self) -> bool {
        self.warned.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::log::{FileAppender, FileAppenderConfig, JsonFormatter, JsonFormatterConfig};
    use serial_test::serial;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// 记录所有写入的 sink
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) lines: Mutex<Vec<(String, LogLevel, String)>>,
    }

    impl RecordingSink {
        pub(crate) fn messages(&self) -> Vec<String> {
            self.lines
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, m)| m.clone())
                .collect()
        }

        pub(crate) fn channels(&self) -> Vec<String> {
            self.lines
                .lock()
                .unwrap()
                .iter()
                .map(|(c, _, _)| c.clone())
                .collect()
        }
    }

    impl LogSink for RecordingSink {
        fn write(&self, channel: &str, level: LogLevel, message: &str) -> Result<()> {
            self.lines
                .lock()
                .unwrap()
                .push((channel.to_string(), level, message.to_string()));
            Ok(())
        }
    }

    /// 总是失败的 sink
    #[derive(Default)]
    pub(crate) struct FailingSink {
        pub(crate) attempts: AtomicUsize,
    }

    impl LogSink for FailingSink {
        fn write(&self, _channel: &str, _level: LogLevel, _message: &str) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("sink unavailable"))
        }
    }

    #[test]
    fn test_emit_at_info() {
        let sink = Arc::new(RecordingSink::default());
        let emitter = Emitter::new(sink.clone());
        emitter.emit("Foo#bar", r#"{"app":"svc1"}"#);

        let lines = sink.lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "Foo#bar");
        assert_eq!(lines[0].1, LogLevel::Info);
        assert_eq!(lines[0].2, r#"{"app":"svc1"}"#);
    }

    #[test]
    fn test_emit_swallows_sink_failure() {
        let sink = Arc::new(FailingSink::default());
        let emitter = Emitter::new(sink.clone());
        assert!(!emitter.has_warned());

        emitter.emit("Foo#bar", "{}");
        emitter.emit("Foo#bar", "{}");
        assert!(emitter.has_warned());
        assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_logger_sink_writes_file() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("monitor.log");
        let logger = Arc::new(Logger::with_parts(
            LogLevel::Info,
            Arc::new(JsonFormatter::new(JsonFormatterConfig::default())),
            Arc::new(FileAppender::new(FileAppenderConfig {
                file_path: path.to_string_lossy().to_string(),
            })),
        ));
        let emitter = Emitter::new(Arc::new(LoggerSink::new(logger)));
        emitter.emit("app::Foo#bar", r#"{"start":1,"args":[],"app":""}"#);

        let contents = std::fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(contents.trim())?;
        assert_eq!(value["logger"], "app::Foo#bar");
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], r#"{"start":1,"args":[],"app":""}"#);
        assert!(!emitter.has_warned());
        Ok(())
    }

    #[test]
    fn test_logger_sink_unavailable() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        // 父路径是普通文件，目录无法创建
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "")?;
        let logger = Arc::new(Logger::with_parts(
            LogLevel::Info,
            Arc::new(JsonFormatter::new(JsonFormatterConfig::default())),
            Arc::new(FileAppender::new(FileAppenderConfig {
                file_path: blocker.join("monitor.log").to_string_lossy().to_string(),
            })),
        ));
        let emitter = Emitter::new(Arc::new(LoggerSink::new(logger)));
        emitter.emit("app::Foo#bar", "{}");
        assert!(emitter.has_warned());
        Ok(())
    }

    #[test]
    #[serial]
    fn test_managed_sink_routes_by_channel() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("routed.log");
        let logger = Arc::new(Logger::with_parts(
            LogLevel::Info,
            Arc::new(JsonFormatter::new(JsonFormatterConfig::default())),
            Arc::new(FileAppender::new(FileAppenderConfig {
                file_path: path.to_string_lossy().to_string(),
            })),
        ));
        crate::log::add_logger("emitter_test::svc", logger);

        ManagedSink.write("emitter_test::svc::Foo#bar", LogLevel::Info, "routed")?;
        crate::log::remove_logger("emitter_test::svc");

        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.contains("routed"));
        assert!(contents.contains("emitter_test::svc::Foo#bar"));
        Ok(())
    }
}
