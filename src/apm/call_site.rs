//! 调用点描述
//!
//! 拦截方构造 [`CallSite`]，描述被调用方法的身份、方法与类型上的标记以及可见性。
//! 匹配器只读这一结构，不做任何反射。

use crate::apm::marker::{Marker, MarkerSet};

/// 方法可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Crate,
    Private,
}

/// 可被监控的类型
///
/// 提供类型级标记，等价于类型上的注解，对该类型的所有方法生效。
/// 一般通过 [`monitored!`](crate::monitored) 宏实现。
pub trait Monitored {
    fn type_markers() -> MarkerSet {
        MarkerSet::new()
    }
}

/// 一次被拦截调用的调用点
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub declaring_type: String,
    pub method_name: String,
    pub type_markers: MarkerSet,
    pub method_markers: MarkerSet,
    pub visibility: Visibility,
    pub is_final: bool,
}

impl CallSite {
    pub fn new(declaring_type: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
            type_markers: MarkerSet::new(),
            method_markers: MarkerSet::new(),
            visibility: Visibility::Public,
            is_final: false,
        }
    }

    /// 以 `T` 的完整类型名和类型级标记构造调用点
    pub fn of<T: Monitored + ?Sized>(method_name: impl Into<String>) -> Self {
        let mut site = Self::new(std::any::type_name::<T>(), method_name);
        site.type_markers = T::type_markers();
        site
    }

    pub fn with_type_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.type_markers.extend(markers);
        self
    }

    pub fn with_method_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.method_markers.extend(markers);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// 日志通道名：`类型#方法`
    pub fn channel(&self) -> String {
        format!("{}#{}", self.declaring_type, self.method_name)
    }

    /// 拦截机制能否包装该方法
    ///
    /// 私有方法和 final 方法处在代理边界之外，拦截方不会把它们交给匹配器，
    /// 匹配器也不会声称支持它们
    pub fn is_interceptable(&self) -> bool {
        self.visibility != Visibility::Private && !self.is_final
    }

    pub fn method_has(&self, marker: &Marker) -> bool {
        self.method_markers.contains(marker)
    }

    pub fn type_has(&self, marker: &Marker) -> bool {
        self.type_markers.contains(marker)
    }
}
