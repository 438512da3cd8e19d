//! 文件配置源
//!
//! 从本地文件系统加载配置，支持 JSON/JSON5/YAML/TOML 格式

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use super::source::{ConfigSource, ConfigValue};
use crate::{impl_box_from, impl_from};

/// 文件配置源的配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileSourceConfig {
    /// 配置文件所在目录
    pub base_path: String,
}

/// 文件配置源
///
/// 按 key 在 `base_path` 下查找 `<key>.json`、`<key>.json5`、`<key>.yaml`、
/// `<key>.yml`、`<key>.toml`，命中第一个即按扩展名解析
pub struct FileSource {
    base_path: PathBuf,
}

impl FileSource {
    pub fn new(config: FileSourceConfig) -> Self {
        Self {
            base_path: config.base_path.into(),
        }
    }

    fn find_config_file(&self, key: &str) -> Result<(PathBuf, &'static str)> {
        for ext in ["json", "json5", "yaml", "yml", "toml"] {
            let path = self.base_path.join(format!("{}.{}", key, ext));
            if path.exists() {
                return Ok((path, ext));
            }
        }
        Err(anyhow!(
            "配置文件不存在: {}/{}",
            self.base_path.display(),
            key
        ))
    }

    fn parse_config(content: &str, ext: &str) -> Result<JsonValue> {
        match ext {
            "json" => Ok(serde_json::from_str(content)?),
            "json5" => Ok(json5::from_str(content)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(content)?),
            "toml" => Ok(toml::from_str(content)?),
            _ => Err(anyhow!("不支持的文件格式: {}", ext)),
        }
    }
}

impl_from!(FileSourceConfig => FileSource);
impl_box_from!(FileSource => dyn ConfigSource);

impl ConfigSource for FileSource {
    fn load(&self, key: &str) -> Result<ConfigValue> {
        let (path, ext) = self.find_config_file(key)?;
        let content = std::fs::read_to_string(path)?;
        Ok(ConfigValue::new(Self::parse_config(&content, ext)?))
    }
}
