//! 方法监控模块
//!
//! 根据方法及其声明类型上的标记决定是否监控一次调用，采集入参、起止时间和结果，
//! 格式化为单行 JSON 后以 INFO 级别写入名为 `类型#方法` 的日志通道。
//!
//! - Before：`LogMethodBefore`，记录 start、args
//! - After：`LogMethodAfter`，正常返回时记录 end、result
//! - Around：`LogMethodAround`，记录 start、end 以及 result 或 error
//!
//! `LogUnMonitor`（方法或类型）、`ExceptionHandler`、`Scheduled`（方法）会排除所有监控，
//! 方法或类型带 `LogMethodAround` 时不再单独执行 Before / After。
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use rustx_apm::apm::{Marker, MonitorMethod, MonitorMethodConfig};
//! use rustx_apm::{call_site, monitor_sync, monitored};
//! use std::sync::Arc;
//!
//! struct UserService {
//!     monitor: Option<Arc<MonitorMethod>>,
//! }
//!
//! monitored!(UserService);
//!
//! impl UserService {
//!     fn get_user(&self, id: u64) -> anyhow::Result<String> {
//!         monitor_sync!(
//!             &self.monitor,
//!             call_site!(UserService, get_user, [Marker::LogMethodAround]),
//!             (id),
//!             Ok(format!("user-{}", id))
//!         )
//!     }
//! }
//! ```

pub mod call;
pub mod call_site;
pub mod clock;
pub mod emitter;
pub mod error;
pub mod formatter;
pub mod global;
pub mod macros;
pub mod marker;
pub mod matcher;
pub mod monitor;

pub use call::{panic_message, to_arg, CallOutcome, InterceptedCall, Opaque, UNSUPPORTED_ARG};
pub use call_site::{CallSite, Monitored, Visibility};
pub use clock::{Clock, SystemClock};
pub use emitter::{Emitter, LogSink, LoggerSink, ManagedSink};
pub use error::MonitorError;
pub use formatter::MonitorFormatter;
pub use global::{get, init, init_from_source, install};
pub use marker::{Marker, MarkerSet};
pub use matcher::{MarkerPattern, MatchRule, Scope, Variant};
pub use monitor::{MonitorMethod, MonitorMethodConfig};
