//! 线程级链路上下文
//!
//! 设置后，当前线程创建的每条 [`LogRecord`](crate::log::LogRecord) 都会带上
//! `traceId` / `spanId` / `parentId`，JSON 输出时平铺在记录顶层。
//! 上下文跟随线程，异步任务跨线程调度时需要在任务内重新设置。

use serde::Serialize;
use std::cell::RefCell;

/// 链路上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

thread_local! {
    static CURRENT: RefCell<Option<TraceContext>> = const { RefCell::new(None) };
}

/// 当前线程的链路上下文
pub fn current_trace() -> Option<TraceContext> {
    CURRENT.with(|current| current.borrow().clone())
}

/// 设置当前线程的链路上下文，guard 释放时恢复之前的值
pub fn set_trace(context: TraceContext) -> TraceGuard {
    let previous = CURRENT.with(|current| current.replace(Some(context)));
    TraceGuard { previous }
}

pub fn clear_trace() {
    CURRENT.with(|current| current.borrow_mut().take());
}

/// [`set_trace`] 返回的 guard
#[must_use]
pub struct TraceGuard {
    previous: Option<TraceContext>,
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}
