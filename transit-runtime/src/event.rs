//! # Event 模块
//!
//! 编排器在推进过程中产生的事件，供 Host 绘制加载界面或记录诊断。
//! 事件只描述已经发生的事情，丢弃它们不会影响过渡本身。

use crate::request::{CueSlot, WorldId};
use crate::state::{TransitionId, TransitionOutcome, TransitionPhase};

/// 过渡事件
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent {
    /// 请求通过校验并获取锁
    Started {
        id: TransitionId,
        cross_world: bool,
    },
    /// 进入新阶段
    PhaseEntered {
        id: TransitionId,
        phase: TransitionPhase,
    },
    /// 世界加载进度（每帧最多一次）
    LoadProgress {
        id: TransitionId,
        world_id: WorldId,
        progress: f32,
    },
    /// 播放了音效插槽
    CuePlayed { id: TransitionId, slot: CueSlot },
    /// 过渡结束，锁已释放
    Finished {
        id: TransitionId,
        outcome: TransitionOutcome,
    },
}

impl TransitionEvent {
    /// 事件所属的过渡
    pub fn transition_id(&self) -> TransitionId {
        match self {
            TransitionEvent::Started { id, .. }
            | TransitionEvent::PhaseEntered { id, .. }
            | TransitionEvent::LoadProgress { id, .. }
            | TransitionEvent::CuePlayed { id, .. }
            | TransitionEvent::Finished { id, .. } => *id,
        }
    }
}
