use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// 声明在方法或类型上的标记，决定方法是否被监控
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Marker {
    /// 记录方法入参
    LogMethodBefore,
    /// 记录方法正常返回的结果
    LogMethodAfter,
    /// 记录方法的开始、结束、结果或错误
    LogMethodAround,
    /// 显式关闭监控
    LogUnMonitor,
    /// 异常处理方法
    ExceptionHandler,
    /// 定时任务方法
    Scheduled,
    /// 业务自定义标记
    Custom(String),
}

/// 一组标记
pub type MarkerSet = HashSet<Marker>;

impl Marker {
    pub fn name(&self) -> &str {
        match self {
            Marker::LogMethodBefore => "LogMethodBefore",
            Marker::LogMethodAfter => "LogMethodAfter",
            Marker::LogMethodAround => "LogMethodAround",
            Marker::LogUnMonitor => "LogUnMonitor",
            Marker::ExceptionHandler => "ExceptionHandler",
            Marker::Scheduled => "Scheduled",
            Marker::Custom(name) => name,
        }
    }
}

impl FromStr for Marker {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Marker::from(s.to_string()))
    }
}

impl From<String> for Marker {
    fn from(s: String) -> Self {
        let known = match s.as_str() {
            "LogMethodBefore" => Some(Marker::LogMethodBefore),
            "LogMethodAfter" => Some(Marker::LogMethodAfter),
            "LogMethodAround" => Some(Marker::LogMethodAround),
            "LogUnMonitor" => Some(Marker::LogUnMonitor),
            "ExceptionHandler" => Some(Marker::ExceptionHandler),
            "Scheduled" => Some(Marker::Scheduled),
            _ => None,
        };
        known.unwrap_or_else(|| Marker::Custom(s))
    }
}

impl From<&str> for Marker {
    fn from(s: &str) -> Self {
        Marker::from(s.to_string())
    }
}

impl From<Marker> for String {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
