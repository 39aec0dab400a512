//! # Orchestrator 模块
//!
//! 过渡编排器：持有单飞锁，驱动阶段状态机，按顺序调用协作者。
//!
//! ## 模块结构
//!
//! - [`engine`]：提交、每帧驱动与阶段切换
//! - [`lock`]：单飞锁、只读探针与结果票据
//! - `in_world`：世界内移动与摄像机偏移保持
//! - `cross_world`：跨世界加载与保留标记

mod cross_world;
pub mod engine;
mod in_world;
pub mod lock;

#[cfg(test)]
mod tests;

pub use engine::{MAX_PENDING_EVENTS, TransitionOrchestrator};
pub use lock::{TransitionLock, TransitionProbe, TransitionTicket};
