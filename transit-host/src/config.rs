//! # Config 模块
//!
//! Host 配置：世界列表、角色、摄像机、触发区域与音频。
//!
//! ## 配置优先级
//!
//! 1. 区域条目自带的效果 / 停顿（最高）
//! 2. 配置文件 (session.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use transit_runtime::{
    AudioCues, ConfigError, Destination, Rect, TransitionConfig, TransitionEffect, Vec2, WorldId,
};

/// Host 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// 过渡系统配置
    #[serde(default)]
    pub transition: TransitionConfig,

    /// 初始世界
    #[serde(default = "default_start_world")]
    pub start_world: WorldId,

    /// 可加载的世界
    #[serde(default = "default_worlds")]
    pub worlds: Vec<WorldEntry>,

    /// 角色配置
    #[serde(default)]
    pub actor: ActorConfig,

    /// 摄像机配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 触发区域
    #[serde(default)]
    pub zones: Vec<ZoneEntry>,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,
}

/// 世界条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEntry {
    /// 世界标识
    pub id: WorldId,

    /// 模拟加载耗时（秒）
    #[serde(default = "default_load_time")]
    pub load_time: f32,

    /// 加载是否失败
    #[serde(default)]
    pub fails: bool,

    /// 到达后是否保留外来角色
    #[serde(default = "default_true")]
    pub keeps_actor: bool,
}

/// 角色配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// 出生点
    #[serde(default)]
    pub spawn: Vec2,

    /// 移动速度（单位/秒）
    #[serde(default = "default_speed")]
    pub speed: f32,
}

/// 摄像机配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 是否创建摄像机
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 相对角色的偏移
    #[serde(default)]
    pub offset: Vec2,

    /// 是否每帧跟随角色
    #[serde(default = "default_true")]
    pub follow: bool,
}

/// 触发区域条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneEntry {
    /// 区域名称
    pub name: String,

    /// 区域所在世界
    pub world: WorldId,

    /// 区域的两个角
    pub min: Vec2,
    pub max: Vec2,

    /// 过渡目标
    pub destination: Destination,

    /// 覆盖默认效果
    #[serde(default)]
    pub effect: Option<TransitionEffect>,

    /// 覆盖默认停顿
    #[serde(default)]
    pub post_cover_delay: Option<f32>,

    /// 音效
    #[serde(default)]
    pub cues: AudioCues,
}

impl ZoneEntry {
    /// 区域矩形
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.min, self.max)
    }
}

/// 音频配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    /// 是否静音
    #[serde(default)]
    pub muted: bool,
}

// 默认值函数
fn default_start_world() -> WorldId {
    WorldId::new("Town")
}

fn default_worlds() -> Vec<WorldEntry> {
    vec![WorldEntry {
        id: default_start_world(),
        load_time: default_load_time(),
        fails: false,
        keeps_actor: true,
    }]
}

fn default_load_time() -> f32 {
    0.5
}

fn default_speed() -> f32 {
    4.0
}

fn default_true() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            transition: TransitionConfig::default(),
            start_world: default_start_world(),
            worlds: default_worlds(),
            actor: ActorConfig::default(),
            camera: CameraConfig::default(),
            zones: Vec::new(),
            audio: AudioConfig::default(),
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::zero(),
            speed: default_speed(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offset: Vec2::zero(),
            follow: true,
        }
    }
}

impl HostConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!(path = ?path, "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件加载失败，使用默认配置");
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

    /// 世界是否已配置
    pub fn has_world(&self, id: &WorldId) -> bool {
        self.worlds.iter().any(|w| &w.id == id)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transition.validate()?;

        let mut seen = HashSet::new();
        for world in &self.worlds {
            if world.id.is_blank() {
                return Err(ConfigError::Validation("世界标识不能为空".to_string()));
            }
            if !seen.insert(&world.id) {
                return Err(ConfigError::Validation(format!(
                    "世界重复定义: {}",
                    world.id
                )));
            }
            if !world.load_time.is_finite() || world.load_time < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "世界 {} 的 load_time 必须是非负数",
                    world.id
                )));
            }
        }

        if !self.has_world(&self.start_world) {
            return Err(ConfigError::Validation(format!(
                "初始世界未定义: {}",
                self.start_world
            )));
        }

        if !self.actor.spawn.is_finite() {
            return Err(ConfigError::Validation("出生点必须是有限坐标".to_string()));
        }
        if !self.actor.speed.is_finite() || self.actor.speed < 0.0 {
            return Err(ConfigError::Validation("角色速度必须是非负数".to_string()));
        }
        if !self.camera.offset.is_finite() {
            return Err(ConfigError::Validation("摄像机偏移必须是有限坐标".to_string()));
        }

        for zone in &self.zones {
            if !self.has_world(&zone.world) {
                return Err(ConfigError::Validation(format!(
                    "区域 {} 所在世界未定义: {}",
                    zone.name, zone.world
                )));
            }
            if !zone.rect().has_area() {
                return Err(ConfigError::Validation(format!(
                    "区域 {} 面积为零",
                    zone.name
                )));
            }
            if let Some(target) = zone.destination.world_id()
                && !self.has_world(target)
            {
                return Err(ConfigError::Validation(format!(
                    "区域 {} 的目标世界未定义: {}",
                    zone.name, target
                )));
            }
        }

        Ok(())
    }
}
