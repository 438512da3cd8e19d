//! 日志模块
//!
//! 方法监控的日志后端：按通道名（`类型#方法`）路由到 logger，
//! logger 由 formatter + appender 组成，均可通过 TypeOptions 配置创建。
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use rustx_apm::log::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config: LoggerCreateConfig = json5::from_str(r#"
//!         {
//!             level: "info",
//!             formatter: { type: "TextFormatter", options: { colored: false } },
//!             appender: { type: "ConsoleAppender", options: { target: "stdout" } }
//!         }
//!     "#)?;
//!
//!     let logger = Logger::new(config)?;
//!     logger.info("app::UserService#get_user", r#"{"app":"svc1"}"#)?;
//!
//!     Ok(())
//! }
//! ```

pub mod appender;
pub mod context;
pub mod formatter;
pub mod global_logger_manager;
pub mod level;
pub mod logger;
pub mod logger_manager;
pub mod record;

pub use appender::{
    register_appenders, ConsoleAppender, ConsoleAppenderConfig, FileAppender, FileAppenderConfig,
    LogAppender, Target,
};
pub use context::{clear_trace, current_trace, set_trace, TraceContext, TraceGuard};
pub use formatter::{
    register_formatters, JsonFormatter, JsonFormatterConfig, LogFormatter, TextFormatter,
    TextFormatterConfig,
};
pub use global_logger_manager::{
    add_logger, get, get_default_logger, global_logger_manager, init_logger_manager,
    remove_logger, resolve,
};
pub use level::LogLevel;
pub use logger::{Logger, LoggerConfig, LoggerCreateConfig};
pub use logger_manager::{LoggerManager, LoggerManagerConfig};
pub use record::LogRecord;
