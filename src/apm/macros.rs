/// 方法监控宏（异步版本）- 按标记对一次方法调用执行 Before / Around / After
///
/// # 使用方式
///
/// ```ignore
/// monitor!(&self.monitor, site, (arg1, arg2), self.repo.find(arg1, arg2).await)
/// ```
///
/// # 参数
///
/// - `$monitor`: `Option<Arc<MonitorMethod>>` 或它的引用，为 None 时直接执行表达式
/// - `$site`: 调用点，一般由 [`call_site!`](crate::call_site) 构造
/// - `($args)`: 记录到 Before 日志中的入参，只在 Before 匹配时才序列化
/// - `expression`: 要执行的表达式（必须返回 `Result<T, E>`，`T: Serialize`，`E: Display`）
///
/// # 示例
///
/// ```ignore
/// impl UserService {
///     pub async fn get_user(&self, id: u64) -> Result<User, UserError> {
///         monitor!(
///             &self.monitor,
///             call_site!(UserService, get_user, [Marker::LogMethodAround]),
///             (id),
///             self.repo.find(id).await
///         )
///     }
/// }
/// ```
#[macro_export]
macro_rules! monitor {
    ($monitor:expr, $site:expr, ($($arg:expr),* $(,)?), $($tokens:tt)+) => {{
        match $monitor {
            Some(ref monitor) => {
                let site = $site;
                monitor
                    .invoke_async(
                        &site,
                        || vec![$($crate::apm::to_arg(&$arg)),*],
                        async { $($tokens)+ },
                    )
                    .await
            }
            None => $($tokens)+,
        }
    }};
}

/// 方法监控宏（同步版本）
///
/// ```ignore
/// fn parse(&self, input: &str) -> anyhow::Result<Ast> {
///     monitor_sync!(
///         rustx_apm::apm::get(),
///         call_site!(Parser, parse, [Marker::LogMethodBefore, Marker::LogMethodAfter]),
///         (input),
///         self.do_parse(input)
///     )
/// }
/// ```
#[macro_export]
macro_rules! monitor_sync {
    ($monitor:expr, $site:expr, ($($arg:expr),* $(,)?), $($tokens:tt)+) => {{
        match $monitor {
            Some(ref monitor) => {
                let site = $site;
                monitor.invoke(
                    &site,
                    || vec![$($crate::apm::to_arg(&$arg)),*],
                    || $($tokens)+,
                )
            }
            None => $($tokens)+,
        }
    }};
}

/// 构造调用点：`call_site!(Type, method)` 或 `call_site!(Type, method, [markers...])`
///
/// 类型级标记来自 `Type` 的 [`Monitored`](crate::apm::Monitored) 实现，
/// 标记可以是 `Marker` 也可以是字符串
#[macro_export]
macro_rules! call_site {
    ($ty:ty, $method:ident) => {
        $crate::apm::CallSite::of::<$ty>(stringify!($method))
    };

    ($ty:ty, $method:ident, [$($marker:expr),+ $(,)?]) => {
        $crate::apm::CallSite::of::<$ty>(stringify!($method))
            .with_method_markers([$($crate::apm::Marker::from($marker)),+])
    };
}

/// 为类型实现 [`Monitored`](crate::apm::Monitored)，可选声明类型级标记
///
/// ```ignore
/// monitored!(UserService, [Marker::LogMethodBefore]);
/// monitored!(HealthCheck);
/// ```
#[macro_export]
macro_rules! monitored {
    ($ty:ty) => {
        impl $crate::apm::Monitored for $ty {}
    };

    ($ty:ty, [$($marker:expr),+ $(,)?]) => {
        impl $crate::apm::Monitored for $ty {
            fn type_markers() -> $crate::apm::MarkerSet {
                [$($crate::apm::Marker::from($marker)),+].into_iter().collect()
            }
        }
    };
}
