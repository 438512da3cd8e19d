/// 毫秒时钟
pub trait Clock: Send + Sync {
    /// 自 Unix 纪元以来的毫秒数
    fn now_millis(&self) -> i64;
}

/// 墙上时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
