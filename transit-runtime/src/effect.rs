//! # Effect 模块
//!
//! 遮罩效果描述：时长、缓动曲线与遮罩颜色。
//!
//! 效果的实际绘制由 `TransitionEffectPlayer` 的实现负责，
//! 这里只定义编排器与播放器之间传递的描述值。

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::InvalidRequestReason;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    #[default]
    EaseInOutQuad,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 正弦缓入缓出
    EaseInOutSine,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)，超出范围会被截断
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// 遮罩颜色（RGBA，分量 0.0 - 1.0）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl CoverColor {
    /// 黑色遮罩
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// 白色遮罩
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// 创建不透明颜色
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// 所有分量是否都在 0.0 - 1.0 内
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for CoverColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// 遮罩效果描述
///
/// `duration` 为单个方向（遮盖或揭开）的时长，单位秒。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEffect {
    /// 单向时长（秒）
    pub duration: f32,
    /// 缓动曲线
    #[serde(default)]
    pub easing: EasingFunction,
    /// 遮罩颜色
    #[serde(default)]
    pub color: CoverColor,
}

impl TransitionEffect {
    /// 黑屏淡入淡出
    pub fn fade(duration: f32) -> Self {
        Self {
            duration,
            easing: EasingFunction::default(),
            color: CoverColor::BLACK,
        }
    }

    /// 白屏淡入淡出
    pub fn fade_white(duration: f32) -> Self {
        Self {
            color: CoverColor::WHITE,
            ..Self::fade(duration)
        }
    }

    /// 设置缓动曲线
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 检查描述是否可以交给播放器
    pub fn validate(&self) -> Result<(), InvalidRequestReason> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(InvalidRequestReason::InvalidEffectDuration(self.duration));
        }
        if !self.color.is_valid() {
            return Err(InvalidRequestReason::InvalidCoverColor);
        }
        Ok(())
    }
}

impl Default for TransitionEffect {
    fn default() -> Self {
        Self::fade(0.5)
    }
}
