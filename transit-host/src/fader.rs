//! # Fader 模块
//!
//! 全屏遮罩淡入淡出，实现 [`TransitionEffectPlayer`]。
//!
//! ## 设计说明
//!
//! - `ScreenFader` 是共享句柄：编排器持有一份用于驱动，渲染端持有另一份读取
//!   `mask_alpha()` / `color()` 绘制遮罩
//! - 遮盖：mask_alpha 当前值 → 1；揭开：当前值 → 0
//! - 从当前值开始补间，因此中途反向不会跳变

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use transit_runtime::{CoverColor, EasingFunction, TransitionEffect, TransitionEffectPlayer};

/// 补间完成判定的容差（秒）
const TWEEN_EPSILON: f32 = 1e-4;

/// 单个 f32 值的补间
#[derive(Debug, Clone)]
struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: EasingFunction,
}

impl Tween {
    fn new(from: f32, to: f32, duration: f32, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    fn is_finished(&self) -> bool {
        self.elapsed + TWEEN_EPSILON >= self.duration
    }

    /// 推进并返回当前值
    fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        if self.is_finished() {
            return self.to;
        }
        let t = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }
}

/// 遮罩阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    /// 完全透明
    #[default]
    Clear,
    /// 正在遮盖
    Covering,
    /// 完全不透明
    Covered,
    /// 正在揭开
    Uncovering,
}

#[derive(Debug)]
struct FaderData {
    mask_alpha: f32,
    color: CoverColor,
    phase: FadePhase,
    tween: Option<Tween>,
}

/// 屏幕遮罩
#[derive(Debug, Clone)]
pub struct ScreenFader {
    inner: Rc<RefCell<FaderData>>,
}

impl ScreenFader {
    /// 创建透明的遮罩
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(FaderData {
                mask_alpha: 0.0,
                color: CoverColor::BLACK,
                phase: FadePhase::Clear,
                tween: None,
            })),
        }
    }

    /// 当前遮罩透明度 (0.0 - 1.0)
    pub fn mask_alpha(&self) -> f32 {
        self.inner.borrow().mask_alpha
    }

    /// 当前遮罩颜色
    pub fn color(&self) -> CoverColor {
        self.inner.borrow().color
    }

    /// 当前阶段
    pub fn phase(&self) -> FadePhase {
        self.inner.borrow().phase
    }

    /// 屏幕是否被完全遮住
    pub fn is_covered(&self) -> bool {
        self.phase() == FadePhase::Covered
    }

    fn start(&self, target: f32, effect: &TransitionEffect, phase: FadePhase) {
        let mut data = self.inner.borrow_mut();
        data.color = effect.color;
        data.phase = phase;
        let tween = Tween::new(data.mask_alpha, target, effect.duration, effect.easing);
        data.tween = Some(tween);
        debug!(phase = ?phase, from = data.mask_alpha, to = target, "遮罩开始");
        drop(data);
        // 零时长立即到达终点
        self.advance(0.0);
    }

    fn advance(&self, dt: f32) {
        let mut data = self.inner.borrow_mut();
        let Some(tween) = data.tween.as_mut() else {
            return;
        };
        let value = tween.advance(dt);
        let finished = tween.is_finished();
        data.mask_alpha = value;

        if finished {
            data.tween = None;
            data.phase = match data.phase {
                FadePhase::Covering => FadePhase::Covered,
                FadePhase::Uncovering => FadePhase::Clear,
                other => other,
            };
        }
    }
}

impl Default for ScreenFader {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionEffectPlayer for ScreenFader {
    fn cover_screen(&mut self, effect: &TransitionEffect) {
        self.start(1.0, effect, FadePhase::Covering);
    }

    fn uncover_screen(&mut self, effect: &TransitionEffect) {
        self.start(0.0, effect, FadePhase::Uncovering);
    }

    fn update(&mut self, dt: f32) {
        self.advance(dt);
    }

    fn is_playing(&self) -> bool {
        self.inner.borrow().tween.is_some()
    }
}
