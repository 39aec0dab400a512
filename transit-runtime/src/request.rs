//! # Request 模块
//!
//! 过渡请求：一次过渡所需的全部信息。
//!
//! 请求在提交时校验，校验失败的请求不会进入状态机，也不会获取锁。

use serde::{Deserialize, Serialize};

use crate::effect::TransitionEffect;
use crate::error::InvalidRequestReason;
use crate::geometry::Vec2;

/// 世界分区标识符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(String);

impl WorldId {
    /// 创建世界 ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 获取 ID 字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 是否为空（或仅包含空白）
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 过渡目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// 当前世界内移动，不加载世界
    InWorld { position: Vec2 },
    /// 替换当前世界后移动
    CrossWorld { world_id: WorldId, position: Vec2 },
}

impl Destination {
    /// 目标位置
    pub fn position(&self) -> Vec2 {
        match self {
            Destination::InWorld { position } => *position,
            Destination::CrossWorld { position, .. } => *position,
        }
    }

    /// 目标世界（仅跨世界）
    pub fn world_id(&self) -> Option<&WorldId> {
        match self {
            Destination::InWorld { .. } => None,
            Destination::CrossWorld { world_id, .. } => Some(world_id),
        }
    }

    /// 是否跨世界
    pub fn is_cross_world(&self) -> bool {
        matches!(self, Destination::CrossWorld { .. })
    }
}

/// 音效片段标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioCue(String);

impl AudioCue {
    /// 创建音效标识
    pub fn new(clip: impl Into<String>) -> Self {
        Self(clip.into())
    }

    /// 获取片段名
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AudioCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 音效插槽
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CueSlot {
    /// 开始遮盖时
    OnStart,
    /// 遮盖完成、停顿开始时
    OnMidpoint,
    /// 揭开完成时
    OnArrival,
}

/// 三个可选的音效插槽
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioCues {
    #[serde(default)]
    pub on_start: Option<AudioCue>,
    #[serde(default)]
    pub on_midpoint: Option<AudioCue>,
    #[serde(default)]
    pub on_arrival: Option<AudioCue>,
}

impl AudioCues {
    /// 获取指定插槽的音效
    pub fn get(&self, slot: CueSlot) -> Option<&AudioCue> {
        match slot {
            CueSlot::OnStart => self.on_start.as_ref(),
            CueSlot::OnMidpoint => self.on_midpoint.as_ref(),
            CueSlot::OnArrival => self.on_arrival.as_ref(),
        }
    }
}

/// 过渡请求
///
/// # 使用示例
///
/// ```ignore
/// let request = TransitionRequest::cross_world("Cave1", Vec2::new(0.0, 0.0))
///     .with_effect(TransitionEffect::fade(0.4))
///     .with_post_cover_delay(0.2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// 目标
    pub destination: Destination,
    /// 遮罩效果（提交时必须存在）
    #[serde(default)]
    pub effect: Option<TransitionEffect>,
    /// 遮盖完成后的停顿时长（秒）
    #[serde(default)]
    pub post_cover_delay: f32,
    /// 音效
    #[serde(default)]
    pub audio_cues: AudioCues,
    /// 输出详细日志
    #[serde(default)]
    pub debug: bool,
}

impl TransitionRequest {
    /// 创建请求（尚未指定效果）
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            effect: None,
            post_cover_delay: 0.0,
            audio_cues: AudioCues::default(),
            debug: false,
        }
    }

    /// 世界内移动
    pub fn in_world(position: Vec2) -> Self {
        Self::new(Destination::InWorld { position })
    }

    /// 跨世界移动
    pub fn cross_world(world_id: impl Into<WorldId>, position: Vec2) -> Self {
        Self::new(Destination::CrossWorld {
            world_id: world_id.into(),
            position,
        })
    }

    /// 设置遮罩效果
    pub fn with_effect(mut self, effect: TransitionEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// 设置停顿时长
    pub fn with_post_cover_delay(mut self, seconds: f32) -> Self {
        self.post_cover_delay = seconds;
        self
    }

    /// 设置音效
    pub fn with_audio_cues(mut self, cues: AudioCues) -> Self {
        self.audio_cues = cues;
        self
    }

    /// 开启详细日志
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// 校验请求
    ///
    /// `is_registered` 用于判断跨世界目标是否可加载，通常由 `WorldLoader` 提供。
    pub fn validate(
        &self,
        is_registered: impl FnOnce(&WorldId) -> bool,
    ) -> Result<&TransitionEffect, InvalidRequestReason> {
        let effect = self
            .effect
            .as_ref()
            .ok_or(InvalidRequestReason::MissingEffect)?;
        effect.validate()?;

        if !self.post_cover_delay.is_finite() || self.post_cover_delay < 0.0 {
            return Err(InvalidRequestReason::InvalidDelay(self.post_cover_delay));
        }

        let position = self.destination.position();
        if !position.is_finite() {
            return Err(InvalidRequestReason::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }

        if let Some(world_id) = self.destination.world_id() {
            if world_id.is_blank() {
                return Err(InvalidRequestReason::EmptyWorldId);
            }
            if !is_registered(world_id) {
                return Err(InvalidRequestReason::UnknownWorld(world_id.clone()));
            }
        }

        Ok(effect)
    }
}
