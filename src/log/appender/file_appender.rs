use crate::log::appender::LogAppender;
use anyhow::Result;
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// FileAppender 配置
#[derive(Debug, Clone, Deserialize)]
pub struct FileAppenderConfig {
    /// 日志文件路径
    pub file_path: String,
}

/// 文件输出器
///
/// 文件在第一次写入时以追加模式打开（必要时创建父目录），
/// 打开失败作为该次 append 的错误返回，下次写入会重试
pub struct FileAppender {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileAppender {
    pub fn new(config: FileAppenderConfig) -> Self {
        Self {
            path: PathBuf::from(config.file_path),
            file: Mutex::new(None),
        }
    }

    /// 获取日志文件路径
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?)
    }
}

impl LogAppender for FileAppender {
    fn append(&self, formatted_message: &str) -> Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(self.open()?);
        }

        if let Some(file) = guard.as_mut() {
            // 单次 write_all 写入整行，避免多进程追加时行被拆开
            let mut line = String::with_capacity(formatted_message.len() + 1);
            line.push_str(formatted_message);
            line.push('\n');
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = guard.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

crate::impl_from!(FileAppenderConfig => FileAppender);
crate::impl_box_from!(FileAppender => dyn LogAppender);
