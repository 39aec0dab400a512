//! # Config 模块
//!
//! 过渡系统配置，在构造编排器和触发器时显式传入。
//!
//! ## 配置优先级
//!
//! 1. 请求本身携带的值（最高）
//! 2. 配置文件
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::effect::TransitionEffect;
use crate::error::ConfigError;

/// 过渡配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// 触发器未指定效果时使用的默认效果
    #[serde(default)]
    pub default_effect: TransitionEffect,

    /// 默认遮盖停顿（秒）
    #[serde(default = "default_post_cover_delay")]
    pub default_post_cover_delay: f32,

    /// 对所有过渡输出阶段级日志（等同于每个请求都开启 `debug`）
    #[serde(default)]
    pub trace_phases: bool,
}

fn default_post_cover_delay() -> f32 {
    0.1
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            default_effect: TransitionEffect::default(),
            default_post_cover_delay: default_post_cover_delay(),
            trace_phases: false,
        }
    }
}

impl TransitionConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "过渡配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!(path = ?path, "过渡配置加载成功");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "过渡配置加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 读取并解析配置文件
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_effect
            .validate()
            .map_err(|e| ConfigError::Validation(format!("默认效果无效: {e}")))?;

        if !self.default_post_cover_delay.is_finite() || self.default_post_cover_delay < 0.0 {
            return Err(ConfigError::Validation(
                "default_post_cover_delay 必须是非负数".to_string(),
            ));
        }

        Ok(())
    }
}
