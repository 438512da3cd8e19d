//! RustX APM - 基于标记的方法监控
//!
//! 按方法和类型上的标记决定是否监控一次调用，把入参、起止时间、结果或错误
//! 格式化为单行 JSON，以 INFO 级别写到名为 `类型#方法` 的日志通道。
//!
//! ## 模块
//!
//! - **apm**: 方法监控（标记、匹配、采集、格式化、输出）
//! - **cfg**: 配置管理（TypeOptions、组件注册表、文件配置源）
//! - **log**: 日志模块（按通道路由的 logger，支持多种格式和输出方式）

pub mod apm;
pub mod cfg;
pub mod log;

// 重新导出主要的公共 API
pub use apm::{
    CallSite, Marker, MatchRule, MonitorError, MonitorFormatter, MonitorMethod,
    MonitorMethodConfig, Monitored, Variant,
};

pub use cfg::{create_trait_from_type_options, register_trait, TypeOptions};

pub use log::{LogAppender, LogFormatter, LogLevel, LogRecord, Logger, LoggerConfig};
