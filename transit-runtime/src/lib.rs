//! # Transit Runtime
//!
//! 场景 / 世界过渡编排的核心运行时库。
//!
//! ## 架构概述
//!
//! `transit-runtime` 是纯逻辑核心，不依赖任何渲染、音频或资源加载实现。
//! 它通过窄接口（见 [`collaborators`]）调用 Host 注入的协作者，
//! 并由 Host 的帧循环驱动：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── submit(TransitionRequest) ───►│ 校验 / 加锁 / 冻结角色 / 开始遮盖
//!   │                                   │
//!   │──── tick(dt) ────────────────────►│ 推进等待中的阶段
//!   │◄─── Option<TransitionReport> ─────│
//!   │                                   │
//! ```
//!
//! ## 核心保证
//!
//! - 同一时间最多一个过渡在执行；并发提交被拒绝而不是排队
//! - 遮罩完全不透明之前不会移动角色；移动（及加载）完成前不会开始揭开
//! - 任何失败都会先揭开屏幕、恢复角色控制，再报告结果
//!
//! ## 模块结构
//!
//! - [`request`]：过渡请求与目标
//! - [`effect`]：遮罩效果描述与缓动曲线
//! - [`collaborators`]：外部协作者接口
//! - [`orchestrator`]：编排器、单飞锁与票据
//! - [`trigger`]：触发区域
//! - [`state`]：阶段与结果
//! - [`event`]：过渡事件
//! - [`config`]：配置
//! - [`error`]：错误类型

pub mod collaborators;
pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod geometry;
pub mod orchestrator;
pub mod request;
pub mod state;
pub mod trigger;

// 重导出核心类型
pub use collaborators::{
    ActorMobility, AudioCuePlayer, CameraRig, Collaborators, LoadHandle, PersistentObject,
    TransitionEffectPlayer, WorldLoader,
};
pub use config::TransitionConfig;
pub use effect::{CoverColor, EasingFunction, TransitionEffect};
pub use error::{
    ConfigError, ErrorKind, InvalidRequestReason, LoadFailure, TransitionError, TransitionResult,
};
pub use event::TransitionEvent;
pub use geometry::{Rect, Vec2};
pub use orchestrator::{
    MAX_PENDING_EVENTS, TransitionOrchestrator, TransitionProbe, TransitionTicket,
};
pub use request::{AudioCue, AudioCues, CueSlot, Destination, TransitionRequest, WorldId};
pub use state::{TransitionId, TransitionOutcome, TransitionPhase, TransitionReport};
pub use trigger::TransitionTrigger;
