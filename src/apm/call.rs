use crate::apm::call_site::CallSite;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::any::Any;

/// 无法序列化的参数在日志中的占位符
pub const UNSUPPORTED_ARG: &str = "[unsupported]";

/// 被调用方法的结果
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// 正常返回
    Returned(Value),
    /// 返回错误或 panic，保存渲染后的错误文本
    Failed(String),
}

/// 一次被拦截调用的上下文
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterceptedCall {
    pub declaring_type: String,
    pub method_name: String,
    pub arguments: Vec<Value>,
    pub start_time_millis: Option<i64>,
    pub end_time_millis: Option<i64>,
    pub outcome: Option<CallOutcome>,
}

impl InterceptedCall {
    pub fn new(site: &CallSite) -> Self {
        Self {
            declaring_type: site.declaring_type.clone(),
            method_name: site.method_name.clone(),
            ..Default::default()
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_start(mut self, millis: i64) -> Self {
        self.start_time_millis = Some(millis);
        self
    }

    /// 设置结束时间，早于开始时间时取开始时间
    pub fn with_end(mut self, millis: i64) -> Self {
        let end = match self.start_time_millis {
            Some(start) => millis.max(start),
            None => millis,
        };
        self.end_time_millis = Some(end);
        self
    }

    pub fn with_outcome(mut self, outcome: CallOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn channel(&self) -> String {
        format!("{}#{}", self.declaring_type, self.method_name)
    }

    /// 正常返回的结果，`()`、`None` 等序列化为 null 的结果视为没有值
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Some(CallOutcome::Returned(value)) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(CallOutcome::Failed(error)) => Some(error),
            _ => None,
        }
    }
}

/// 参数或返回值转为 JSON，失败时降级为占位符
pub fn to_arg<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(UNSUPPORTED_ARG.to_string()))
}

/// 包装流、写入器、请求对象等运行时资源，记录时总是降级为占位符
pub struct Opaque<T>(pub T);

impl<T> Serialize for Opaque<T> {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("opaque resource is not serializable"))
    }
}

/// 提取 panic 负载中的消息
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
