use thiserror::Error;

/// 方法监控错误
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("方法监控已初始化")]
    AlreadyInitialized,

    #[error("配置错误: {0}")]
    InvalidConfig(String),
}

impl From<garde::Report> for MonitorError {
    fn from(report: garde::Report) -> Self {
        MonitorError::InvalidConfig(report.to_string())
    }
}
