//! # Collaborators 模块
//!
//! 编排器依赖的外部协作者接口。
//!
//! ## 设计说明
//!
//! 编排器不关心协作者如何实现（渲染、流式加载、物理、音频），只通过这些窄接口
//! 顺序调用它们。所有接口都在单线程的帧循环中使用，因此不要求 `Send`。
//!
//! "等待"语义统一为轮询：编排器在等待期间每帧调用一次 `update(dt)`，
//! 然后查询完成状态，不会阻塞。

use crate::effect::TransitionEffect;
use crate::geometry::Vec2;
use crate::request::{AudioCue, WorldId};

/// 遮罩效果播放器
///
/// 负责在全屏表面上播放遮盖 / 揭开动画。
pub trait TransitionEffectPlayer {
    /// 开始遮盖屏幕
    fn cover_screen(&mut self, effect: &TransitionEffect);

    /// 开始揭开屏幕
    fn uncover_screen(&mut self, effect: &TransitionEffect);

    /// 推进动画
    fn update(&mut self, dt: f32);

    /// 当前是否仍有动画在播放
    fn is_playing(&self) -> bool;
}

/// 世界加载句柄
pub trait LoadHandle {
    /// 推进加载（由编排器在等待期间每帧调用一次）
    fn update(&mut self, _dt: f32) {}

    /// 是否已完成（成功完成）
    fn is_done(&self) -> bool;

    /// 加载进度 (0.0 - 1.0)
    fn progress(&self) -> f32;

    /// 是否失败
    fn failed(&self) -> bool;
}

/// 需要跨越世界加载保留的对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistentObject {
    /// 玩家角色
    Actor,
    /// 跟随角色的摄像机
    Camera,
}

/// 世界加载器
pub trait WorldLoader {
    /// 世界是否已注册（可加载）
    fn is_registered(&self, world_id: &WorldId) -> bool;

    /// 替换当前所有已加载的世界，加载 `world_id`
    ///
    /// 未注册的世界返回 `None`。
    fn load_replacing(&mut self, world_id: &WorldId) -> Option<Box<dyn LoadHandle>>;

    /// 标记对象在卸载时保留
    fn mark_persistent(&mut self, object: PersistentObject);

    /// 清除保留标记
    fn clear_persistent(&mut self, object: PersistentObject);

    /// 将对象归属到指定世界
    fn adopt(&mut self, object: PersistentObject, world_id: &WorldId);

    /// 对象是否仍然存在
    fn is_alive(&self, object: PersistentObject) -> bool;
}

/// 角色移动控制
pub trait ActorMobility {
    /// 禁止移动
    fn disable(&mut self);

    /// 允许移动
    fn enable(&mut self);

    /// 速度清零
    fn zero_velocity(&mut self);

    /// 当前位置
    fn position(&self) -> Vec2;

    /// 直接设置位置
    fn set_position(&mut self, position: Vec2);
}

/// 摄像机
pub trait CameraRig {
    /// 当前位置
    fn position(&self) -> Vec2;

    /// 设置位置
    fn set_position(&mut self, position: Vec2);
}

/// 音效播放（即发即弃）
pub trait AudioCuePlayer {
    /// 播放音效
    fn play(&mut self, cue: &AudioCue);
}

/// 注入编排器的协作者集合
///
/// `camera` 为 `None` 时跳过摄像机相关步骤（没有跟随角色的摄像机）。
pub struct Collaborators {
    pub effects: Box<dyn TransitionEffectPlayer>,
    pub loader: Box<dyn WorldLoader>,
    pub actor: Box<dyn ActorMobility>,
    pub camera: Option<Box<dyn CameraRig>>,
    pub audio: Box<dyn AudioCuePlayer>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("camera", &self.camera.is_some())
            .finish_non_exhaustive()
    }
}
