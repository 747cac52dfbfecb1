//! 运行时配置.
//!
//! 从 JSON 文件加载日志与编码器后端配置, 未给出 `encoders` 时使用构建时启用的集合.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec::BackendSet;
use crate::logging::LoggingConfig;

/// 覆盖启用后端的环境变量 (逗号分隔的后端名称)
pub const ENV_ENCODERS: &str = "VENC_ENCODERS";
/// 覆盖日志级别的环境变量
pub const ENV_LOG_LEVEL: &str = "VENC_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VencConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "BackendSet::from_build")]
    pub encoders: BackendSet,
}

impl Default for VencConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            encoders: BackendSet::from_build(),
        }
    }
}

impl VencConfig {
    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("解析配置失败")
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("配置文件无效, path={}", path.display()))
    }

    /// 应用环境变量覆盖
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数应用覆盖项
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(list) = lookup(ENV_ENCODERS) {
            self.encoders = BackendSet::parse_list(&list)
                .with_context(|| format!("{ENV_ENCODERS}={list} 无效"))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_空配置使用默认值() {
        let config = VencConfig::from_json("{}").unwrap();
        assert_eq!(config, VencConfig::default());
        assert_eq!(config.encoders, BackendSet::from_build());
    }

    #[test]
    fn test_显式后端列表() {
        let config = VencConfig::from_json(r#"{"encoders": ["hw_mjpeg", "sw_h264"]}"#).unwrap();
        assert_eq!(config.encoders, BackendSet::HW_MJPEG | BackendSet::SW_H264);

        let config = VencConfig::from_json(r#"{"encoders": []}"#).unwrap();
        assert!(config.encoders.is_empty());
    }

    #[test]
    fn test_未知后端报错() {
        assert!(VencConfig::from_json(r#"{"encoders": ["vp8"]}"#).is_err());
    }

    #[test]
    fn test_覆盖项() {
        let config = VencConfig::default()
            .apply_overrides(|key| match key {
                ENV_ENCODERS => Some("sw_mjpeg".to_string()),
                ENV_LOG_LEVEL => Some("trace".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.encoders, BackendSet::SW_MJPEG);
        assert_eq!(config.logging.level, "trace");

        let result = VencConfig::default().apply_overrides(|key| {
            (key == ENV_ENCODERS).then(|| "h265".to_string())
        });
        assert!(result.is_err());
    }
}
