use crate::apm::call::InterceptedCall;
use serde::Serialize;
use serde_json::Value;

/// 监控记录中的字段，按序列化顺序排列
#[derive(Serialize)]
struct MonitorRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    app: &'a str,
}

/// 把一次调用格式化为单行 JSON
///
/// 字段顺序固定为 start、end、args、result、error、app，缺失字段不输出，
/// app 总是输出。相同输入总是得到相同输出。
#[derive(Debug, Clone, Default)]
pub struct MonitorFormatter {
    app_name: String,
}

impl MonitorFormatter {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Before 阶段（只有 start）才输出 args
    pub fn format(&self, call: &InterceptedCall) -> String {
        let args = match (call.start_time_millis, call.end_time_millis) {
            (Some(_), None) => Some(call.arguments.as_slice()),
            _ => None,
        };

        let record = MonitorRecord {
            start: call.start_time_millis,
            end: call.end_time_millis,
            args,
            result: call.result(),
            error: call.error(),
            app: &self.app_name,
        };

        serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string())
    }
}
