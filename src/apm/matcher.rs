use crate::apm::call_site::CallSite;
use crate::apm::marker::Marker;
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// 标记的查找范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 只看方法上的标记
    Method,
    /// 只看声明类型上的标记
    Type,
    /// 方法或声明类型任一处
    #[default]
    Any,
}

/// 单个标记条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPattern {
    pub marker: Marker,
    #[serde(default)]
    pub scope: Scope,
}

impl MarkerPattern {
    pub fn new(marker: Marker, scope: Scope) -> Self {
        Self { marker, scope }
    }

    pub fn method(marker: Marker) -> Self {
        Self::new(marker, Scope::Method)
    }

    pub fn any(marker: Marker) -> Self {
        Self::new(marker, Scope::Any)
    }

    pub fn matches(&self, site: &CallSite) -> bool {
        match self.scope {
            Scope::Method => site.method_has(&self.marker),
            Scope::Type => site.type_has(&self.marker),
            Scope::Any => site.method_has(&self.marker) || site.type_has(&self.marker),
        }
    }
}

/// 监控变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Before,
    After,
    Around,
}

/// 匹配规则
///
/// 命中任一 include 且不命中任何 exclude 时匹配，exclude 优先。
/// 启动时由配置构建，之后只读。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct MatchRule {
    #[garde(length(min = 1))]
    pub include: Vec<MarkerPattern>,

    #[garde(skip)]
    pub exclude: Vec<MarkerPattern>,
}

impl MatchRule {
    pub fn new(include: Vec<MarkerPattern>, exclude: Vec<MarkerPattern>) -> Self {
        Self { include, exclude }
    }

    /// 所有变体共有的排除项：异常处理方法、定时任务方法、显式关闭监控
    pub fn common_exclusions() -> Vec<MarkerPattern> {
        vec![
            MarkerPattern::method(Marker::ExceptionHandler),
            MarkerPattern::method(Marker::Scheduled),
            MarkerPattern::any(Marker::LogUnMonitor),
        ]
    }

    pub fn before() -> Self {
        let mut exclude = Self::common_exclusions();
        exclude.push(MarkerPattern::any(Marker::LogMethodAround));
        Self::new(vec![MarkerPattern::any(Marker::LogMethodBefore)], exclude)
    }

    pub fn after() -> Self {
        let mut exclude = Self::common_exclusions();
        exclude.push(MarkerPattern::any(Marker::LogMethodAround));
        Self::new(vec![MarkerPattern::any(Marker::LogMethodAfter)], exclude)
    }

    pub fn around() -> Self {
        Self::new(
            vec![MarkerPattern::any(Marker::LogMethodAround)],
            Self::common_exclusions(),
        )
    }

    /// 内置规则
    pub fn builtin(variant: Variant) -> Self {
        match variant {
            Variant::Before => Self::before(),
            Variant::After => Self::after(),
            Variant::Around => Self::around(),
        }
    }

    pub fn matches(&self, site: &CallSite) -> bool {
        if !site.is_interceptable() {
            return false;
        }

        if self.exclude.iter().any(|p| p.matches(site)) {
            return false;
        }

        self.include.iter().any(|p| p.matches(site))
    }
}
