use crate::apm::error::MonitorError;
use crate::apm::monitor::{MonitorMethod, MonitorMethodConfig};
use crate::cfg::ConfigSource;
use anyhow::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 进程级方法监控，只能初始化一次
static GLOBAL_MONITOR: OnceCell<Arc<MonitorMethod>> = OnceCell::new();

/// 初始化全局方法监控
///
/// # 示例
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     let config: MonitorMethodConfig = json5::from_str(r#"{ "app-name": "svc1" }"#)?;
///     rustx_apm::apm::init(config)?;
///     Ok(())
/// }
/// ```
pub fn init(config: MonitorMethodConfig) -> Result<()> {
    let monitor = MonitorMethod::new(config)?;
    install(monitor)
}

/// 从配置源加载 key 对应的配置并初始化
pub fn init_from_source(source: &dyn ConfigSource, key: &str) -> Result<()> {
    let config: MonitorMethodConfig = source.load(key)?.into_type()?;
    init(config)
}

/// 安装已构造好的监控实例
pub fn install(monitor: MonitorMethod) -> Result<()> {
    GLOBAL_MONITOR
        .set(Arc::new(monitor))
        .map_err(|_| MonitorError::AlreadyInitialized)?;
    Ok(())
}

/// 获取全局方法监控，未初始化时返回 None
pub fn get() -> Option<Arc<MonitorMethod>> {
    GLOBAL_MONITOR.get().cloned()
}
