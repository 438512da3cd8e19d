use crate::apm::call::{panic_message, to_arg, CallOutcome, InterceptedCall};
use crate::apm::call_site::CallSite;
use crate::apm::clock::{Clock, SystemClock};
use crate::apm::emitter::{Emitter, LogSink, LoggerSink, ManagedSink};
use crate::apm::error::MonitorError;
use crate::apm::formatter::MonitorFormatter;
use crate::apm::matcher::{MatchRule, Variant};
use crate::log::{Logger, LoggerConfig};
use anyhow::Result;
use futures::FutureExt;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smart_default::SmartDefault;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// 方法监控配置
///
/// ```ignore
/// let config: MonitorMethodConfig = json5::from_str(r#"{
///     "app-name": "svc1",
///     logger: {
///         formatter: { type: "JsonFormatter" },
///         appender: { type: "FileAppender", options: { file_path: "logs/monitor.log" } }
///     }
/// }"#)?;
/// ```
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct MonitorMethodConfig {
    /// 应用名，写入每条记录的 app 字段
    #[serde(alias = "app-name")]
    #[garde(length(max = 256))]
    pub app_name: String,

    /// 总开关，关闭后三种监控都不生效
    #[default = true]
    #[garde(skip)]
    pub enabled: bool,

    #[default(MatchRule::before())]
    #[garde(dive)]
    pub before: MatchRule,

    #[default(MatchRule::after())]
    #[garde(dive)]
    pub after: MatchRule,

    #[default(MatchRule::around())]
    #[garde(dive)]
    pub around: MatchRule,

    /// 不配置时按通道名路由到全局 LoggerManager
    #[garde(skip)]
    pub logger: Option<LoggerConfig>,
}

/// 方法监控
///
/// 规则在构造时确定，之后只读；所有记录都在调用方线程（或调用方的 future）内同步写出，
/// 记录失败不会影响被监控的方法
pub struct MonitorMethod {
    enabled: bool,
    before: MatchRule,
    after: MatchRule,
    around: MatchRule,
    formatter: MonitorFormatter,
    emitter: Emitter,
    clock: Arc<dyn Clock>,
}

impl MonitorMethod {
    pub fn new(config: MonitorMethodConfig) -> Result<Self> {
        config.validate().map_err(MonitorError::from)?;

        let sink: Arc<dyn LogSink> = match config.logger {
            Some(logger_config) => Arc::new(LoggerSink::new(Logger::resolve(logger_config)?)),
            None => Arc::new(ManagedSink),
        };

        Ok(Self {
            enabled: config.enabled,
            before: config.before,
            after: config.after,
            around: config.around,
            formatter: MonitorFormatter::new(config.app_name),
            emitter: Emitter::new(sink),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.emitter = Emitter::new(sink);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn app_name(&self) -> &str {
        self.formatter.app_name()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rule(&self, variant: Variant) -> &MatchRule {
        match variant {
            Variant::Before => &self.before,
            Variant::After => &self.after,
            Variant::Around => &self.around,
        }
    }

    /// 该调用点是否适用指定的监控变体
    pub fn matches(&self, variant: Variant, site: &CallSite) -> bool {
        self.enabled && self.rule(variant).matches(site)
    }

    /// 记录方法入参和开始时间
    pub fn before(&self, site: &CallSite, args: &[Value]) {
        let call = InterceptedCall::new(site)
            .with_arguments(args.to_vec())
            .with_start(self.clock.now_millis());
        self.emit(&call);
    }

    /// 记录正常返回的结果和结束时间
    pub fn after_returning<T: Serialize + ?Sized>(&self, site: &CallSite, result: &T) {
        let call = InterceptedCall::new(site)
            .with_end(self.clock.now_millis())
            .with_outcome(CallOutcome::Returned(to_arg(result)));
        self.emit(&call);
    }

    /// 包装一次同步调用，记录开始、结束以及结果或错误
    ///
    /// 错误以 `{:#}` 渲染（anyhow 错误为 `context: cause` 单行形式）后原样返回；
    /// panic 记录后以原负载继续展开
    pub fn around<T, E, F>(&self, site: &CallSite, f: F) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let start = self.clock.now_millis();
        let outcome = panic::catch_unwind(AssertUnwindSafe(f));
        self.complete(site, start, outcome)
    }

    /// [`around`](Self::around) 的异步版本
    pub async fn around_async<T, E, Fut>(&self, site: &CallSite, fut: Fut) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = self.clock.now_millis();
        let outcome = AssertUnwindSafe(fut).catch_unwind().await;
        self.complete(site, start, outcome)
    }

    /// 按匹配结果依次执行 Before、Around（未匹配时直接调用）和 After
    ///
    /// 入参只在 Before 匹配时才求值
    pub fn invoke<T, E, A, F>(&self, site: &CallSite, args: A, f: F) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        A: FnOnce() -> Vec<Value>,
        F: FnOnce() -> Result<T, E>,
    {
        if self.matches(Variant::Before, site) {
            self.before(site, &args());
        }

        let result = if self.matches(Variant::Around, site) {
            self.around(site, f)
        } else {
            f()
        };

        self.after_if_matched(site, &result);
        result
    }

    /// [`invoke`](Self::invoke) 的异步版本
    pub async fn invoke_async<T, E, A, Fut>(&self, site: &CallSite, args: A, fut: Fut) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        A: FnOnce() -> Vec<Value>,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.matches(Variant::Before, site) {
            self.before(site, &args());
        }

        let result = if self.matches(Variant::Around, site) {
            self.around_async(site, fut).await
        } else {
            fut.await
        };

        self.after_if_matched(site, &result);
        result
    }

    fn after_if_matched<T: Serialize, E>(&self, site: &CallSite, result: &Result<T, E>) {
        if let Ok(value) = result {
            if self.matches(Variant::After, site) {
                self.after_returning(site, value);
            }
        }
    }

    fn complete<T, E>(
        &self,
        site: &CallSite,
        start: i64,
        outcome: std::thread::Result<Result<T, E>>,
    ) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
    {
        let call = InterceptedCall::new(site).with_start(start);

        match outcome {
            Ok(Ok(value)) => {
                let call = call
                    .with_end(self.clock.now_millis())
                    .with_outcome(CallOutcome::Returned(to_arg(&value)));
                self.emit(&call);
                Ok(value)
            }
            Ok(Err(e)) => {
                let call = call
                    .with_end(self.clock.now_millis())
                    .with_outcome(CallOutcome::Failed(format!("{:#}", e)));
                self.emit(&call);
                Err(e)
            }
            Err(payload) => {
                let call = call
                    .with_end(self.clock.now_millis())
                    .with_outcome(CallOutcome::Failed(panic_message(payload.as_ref())));
                self.emit(&call);
                panic::resume_unwind(payload)
            }
        }
    }

    fn emit(&self, call: &InterceptedCall) {
        let message = self.formatter.format(call);
        self.emitter.emit(&call.channel(), &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apm::call::{Opaque, UNSUPPORTED_ARG};
    use crate::apm::clock::tests::ManualClock;
    use crate::apm::emitter::tests::{FailingSink, RecordingSink};
    use crate::apm::marker::Marker;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    enum LookupError {
        NotFound,
    }

    impl std::fmt::Display for LookupError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                LookupError::NotFound => f.write_str("NotFound"),
            }
        }
    }

    fn monitor(sink: Arc<RecordingSink>) -> MonitorMethod {
        let config = MonitorMethodConfig {
            app_name: "svc1".to_string(),
            ..Default::default()
        };
        MonitorMethod::new(config)
            .unwrap()
            .with_sink(sink)
            .with_clock(Arc::new(ManualClock::new(1000, 5)))
    }

    fn site(method_markers: &[Marker]) -> CallSite {
        CallSite::new("Foo", "bar").with_method_markers(method_markers.iter().cloned())
    }

    fn parse(line: &str) -> serde_json::Map<String, Value> {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = MonitorMethodConfig::default();
        assert_eq!(config.app_name, "");
        assert!(config.enabled);
        assert_eq!(config.before, MatchRule::before());
        assert_eq!(config.after, MatchRule::after());
        assert_eq!(config.around, MatchRule::around());
        assert!(config.logger.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json5() {
        let config: MonitorMethodConfig = json5::from_str(
            r#"{
                "app-name": "svc1",
                enabled: false,
                logger: { level: "debug" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.app_name, "svc1");
        assert!(!config.enabled);
        assert_eq!(config.around, MatchRule::around());
        assert!(matches!(config.logger, Some(LoggerConfig::Create(ref c)) if c.level == "debug"));

        let config: MonitorMethodConfig = json5::from_str(r#"{ app_name: "svc2" }"#).unwrap();
        assert_eq!(config.app_name, "svc2");
    }

    #[test]
    fn test_config_invalid() {
        let config = MonitorMethodConfig {
            app_name: "x".repeat(257),
            ..Default::default()
        };
        assert!(MonitorMethod::new(config).is_err());

        let config = MonitorMethodConfig {
            around: MatchRule::default(),
            ..Default::default()
        };
        let err = MonitorMethod::new(config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<MonitorError>(),
            Some(MonitorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_before_record() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        monitor.before(&site(&[Marker::LogMethodBefore]), &[json!("x"), json!(5)]);

        assert_eq!(sink.channels(), vec!["Foo#bar"]);
        assert_eq!(
            sink.messages(),
            vec![r#"{"start":1000,"args":["x",5],"app":"svc1"}"#]
        );
    }

    #[test]
    fn test_after_returning_record() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        monitor.after_returning(&site(&[Marker::LogMethodAfter]), &json!({"id": 7}));

        assert_eq!(
            sink.messages(),
            vec![r#"{"end":1000,"result":{"id":7},"app":"svc1"}"#]
        );
    }

    #[test]
    fn test_around_success() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        let result: Result<&str, LookupError> =
            monitor.around(&site(&[Marker::LogMethodAround]), || Ok("matched"));
        assert_eq!(result, Ok("matched"));

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        let record = parse(&messages[0]);
        assert_eq!(record["result"], "matched");
        assert!(!record.contains_key("error"));
        assert!(!record.contains_key("args"));
        assert!(record["end"].as_i64().unwrap() >= record["start"].as_i64().unwrap());
        assert_eq!(record["app"], "svc1");
    }

    #[test]
    fn test_around_failure_returns_error_unchanged() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        let result: Result<String, LookupError> =
            monitor.around(&site(&[Marker::LogMethodAround]), || Err(LookupError::NotFound));
        assert_eq!(result, Err(LookupError::NotFound));

        assert_eq!(
            sink.messages(),
            vec![r#"{"start":1000,"end":1005,"error":"NotFound","app":"svc1"}"#]
        );
    }

    #[test]
    fn test_around_panic_is_logged_and_resumed() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), LookupError> =
                monitor.around(&site(&[Marker::LogMethodAround]), || panic!("exploded"));
        }));
        let payload = caught.err().unwrap();
        assert_eq!(panic_message(payload.as_ref()), "exploded");

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        let record = parse(&messages[0]);
        assert_eq!(record["error"], "exploded");
        assert!(!record.contains_key("result"));
    }

    #[test]
    fn test_invoke_before_and_after() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());
        let s = site(&[Marker::LogMethodBefore, Marker::LogMethodAfter]);

        let result: Result<i32, LookupError> =
            monitor.invoke(&s, || vec![to_arg("x"), to_arg(&5)], || Ok(42));
        assert_eq!(result, Ok(42));

        assert_eq!(
            sink.messages(),
            vec![
                r#"{"start":1000,"args":["x",5],"app":"svc1"}"#.to_string(),
                r#"{"end":1005,"result":42,"app":"svc1"}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_invoke_after_skipped_on_error() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());
        let s = site(&[Marker::LogMethodAfter]);

        let result: Result<i32, LookupError> =
            monitor.invoke(&s, Vec::new, || Err(LookupError::NotFound));
        assert_eq!(result, Err(LookupError::NotFound));
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_invoke_around_suppresses_before_and_after() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());
        let s = site(&[
            Marker::LogMethodAround,
            Marker::LogMethodBefore,
            Marker::LogMethodAfter,
        ]);

        let _: Result<i32, LookupError> = monitor.invoke(&s, Vec::new, || Ok(1));

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        let record = parse(&messages[0]);
        assert!(record.contains_key("start"));
        assert!(record.contains_key("end"));
    }

    #[test]
    fn test_invoke_unmatched_and_excluded() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        let evaluated = std::cell::Cell::new(false);
        let args = || {
            evaluated.set(true);
            vec![]
        };
        let _: Result<i32, LookupError> = monitor.invoke(&site(&[]), args, || Ok(1));
        assert!(!evaluated.get());

        let excluded = site(&[Marker::LogMethodAround, Marker::ExceptionHandler]);
        let _: Result<i32, LookupError> = monitor.invoke(&excluded, Vec::new, || Ok(1));

        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_disabled_monitor() {
        let sink = Arc::new(RecordingSink::default());
        let config = MonitorMethodConfig {
            enabled: false,
            ..Default::default()
        };
        let monitor = MonitorMethod::new(config).unwrap().with_sink(sink.clone());
        let s = site(&[Marker::LogMethodAround]);

        assert!(!monitor.matches(Variant::Around, &s));
        let _: Result<i32, LookupError> = monitor.invoke(&s, Vec::new, || Ok(1));
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_opaque_argument_degrades_to_placeholder() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());
        let writer = Opaque(std::io::sink());

        monitor.before(
            &site(&[Marker::LogMethodBefore]),
            &[to_arg("x"), to_arg(&writer)],
        );

        let record = parse(&sink.messages()[0]);
        assert_eq!(record["args"], json!(["x", UNSUPPORTED_ARG]));
    }

    #[test]
    fn test_sink_failure_does_not_affect_call() {
        let sink = Arc::new(FailingSink::default());
        let monitor = MonitorMethod::new(MonitorMethodConfig::default())
            .unwrap()
            .with_sink(sink.clone());
        let s = site(&[Marker::LogMethodAround]);

        let result: Result<&str, LookupError> = monitor.around(&s, || Ok("matched"));
        assert_eq!(result, Ok("matched"));
        let result: Result<&str, LookupError> = monitor.around(&s, || Err(LookupError::NotFound));
        assert_eq!(result, Err(LookupError::NotFound));
        assert_eq!(sink.attempts.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unit_and_none_results_omit_result_key() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        let result: Result<(), LookupError> =
            monitor.invoke(&site(&[Marker::LogMethodAround]), Vec::new, || Ok(()));
        assert_eq!(result, Ok(()));

        let result: Result<Option<i32>, LookupError> =
            monitor.invoke(&site(&[Marker::LogMethodAfter]), Vec::new, || Ok(None));
        assert_eq!(result, Ok(None));

        assert_eq!(
            sink.messages(),
            vec![
                r#"{"start":1000,"end":1005,"app":"svc1"}"#.to_string(),
                r#"{"end":1010,"app":"svc1"}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_error_chain_rendered_on_one_line() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());

        let result: Result<i32, anyhow::Error> =
            monitor.around(&site(&[Marker::LogMethodAround]), || {
                Err(anyhow::anyhow!("disk gone").context("load user"))
            });
        assert_eq!(result.unwrap_err().to_string(), "load user");

        let record = parse(&sink.messages()[0]);
        assert_eq!(record["error"], "load user: disk gone");
    }

    #[test]
    fn test_monitor_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MonitorMethod>();

        let sink = Arc::new(RecordingSink::default());
        let monitor = Arc::new(monitor(sink.clone()));
        let s = site(&[Marker::LogMethodAround]);

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let monitor = Arc::clone(&monitor);
                let s = &s;
                scope.spawn(move || {
                    for i in 0..10 {
                        let result: Result<i32, LookupError> =
                            monitor.invoke(s, Vec::new, || Ok(worker * 100 + i));
                        assert_eq!(result, Ok(worker * 100 + i));
                    }
                });
            }
        });

        let messages = sink.messages();
        assert_eq!(messages.len(), 80);
        let mut results: Vec<i64> = messages
            .iter()
            .map(|m| parse(m)["result"].as_i64().unwrap())
            .collect();
        results.sort();
        let expected: Vec<i64> = (0..8)
            .flat_map(|w| (0..10).map(move |i| w * 100 + i))
            .collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn test_invoke_async() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());
        let s = site(&[Marker::LogMethodAround]);

        let result: Result<String, LookupError> = monitor
            .invoke_async(&s, Vec::new, async { Ok("matched".to_string()) })
            .await;
        assert_eq!(result, Ok("matched".to_string()));

        let result: Result<String, LookupError> = monitor
            .around_async(&s, async { Err(LookupError::NotFound) })
            .await;
        assert_eq!(result, Err(LookupError::NotFound));

        assert_eq!(
            sink.messages(),
            vec![
                r#"{"start":1000,"end":1005,"result":"matched","app":"svc1"}"#.to_string(),
                r#"{"start":1010,"end":1015,"error":"NotFound","app":"svc1"}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_around_async_panic() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(sink.clone());
        let s = site(&[Marker::LogMethodAround]);

        let caught = AssertUnwindSafe(monitor.around_async(&s, async {
            let result: Result<(), LookupError> = panic!("async exploded");
            result
        }))
        .catch_unwind()
        .await;
        assert!(caught.is_err());

        let record = parse(&sink.messages()[0]);
        assert_eq!(record["error"], "async exploded");
    }
}
