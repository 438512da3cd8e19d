use anyhow::Result;

/// 日志输出器 trait
///
/// 同步写入，调用方所在线程内完成；实现需自行保证并发安全
pub trait LogAppender: Send + Sync {
    /// 输出一行已格式化的日志（实现负责追加换行符）
    fn append(&self, formatted_message: &str) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
