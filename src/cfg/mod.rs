//! cfg 模块 - 配置管理
//!
//! 提供 TypeOptions 驱动的组件注册表，以及从文件加载配置的能力

pub mod file_source;
pub mod macros;
pub mod registry;
pub mod source;
pub mod type_options;

pub use file_source::{FileSource, FileSourceConfig};
pub use registry::{create_trait_from_type_options, register_trait};
pub use source::{ConfigSource, ConfigValue};
pub use type_options::TypeOptions;
