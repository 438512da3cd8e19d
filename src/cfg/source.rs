//! 配置源抽象
//!
//! 提供统一的配置来源接口，监控配置在进程启动时加载一次

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// 配置值包装，提供类型转换能力
///
/// # 示例
/// ```no_run
/// use rustx_apm::apm::MonitorMethodConfig;
/// use rustx_apm::cfg::{ConfigSource, FileSource, FileSourceConfig};
///
/// let source = FileSource::new(FileSourceConfig {
///     base_path: "config".to_string(),
/// });
///
/// let config: MonitorMethodConfig = source.load("monitor").unwrap().into_type().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigValue(pub JsonValue);

impl ConfigValue {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// 转换为指定类型（消费 self）
    pub fn into_type<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.0)?)
    }

    /// 获取内部的 JsonValue 引用
    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }
}

/// 配置源
pub trait ConfigSource: Send + Sync {
    /// 按 key 加载配置
    fn load(&self, key: &str) -> Result<ConfigValue>;
}
