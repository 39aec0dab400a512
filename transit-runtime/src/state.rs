//! # State 模块
//!
//! 过渡阶段与结果模型。
//!
//! ## 阶段转换
//!
//! ```text
//! Idle ─submit─► Validating ─► FreezingActor ─► CoveringScreen ─► Relocating
//!                    │                                               │
//!                    └─► (拒绝, 不加锁)        Holding ◄─────────────┤
//!                                                │                  │ (加载失败/角色丢失)
//!                                                ▼                  ▼
//!                                        UncoveringScreen ◄─────────┘
//!                                                │
//!                                                ▼
//!                                           Restoring ─► Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, TransitionError};

/// 过渡阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransitionPhase {
    /// 空闲
    #[default]
    Idle,
    /// 校验请求
    ///
    /// 在 `submit` 内同步完成且不持锁：`phase()` 不会返回它，
    /// 也不会产生对应的 `PhaseEntered` 事件。
    Validating,
    /// 冻结角色
    FreezingActor,
    /// 遮盖屏幕
    CoveringScreen,
    /// 移动角色（可能加载世界）
    Relocating,
    /// 遮盖停顿
    Holding,
    /// 揭开屏幕
    UncoveringScreen,
    /// 恢复控制
    Restoring,
}

impl TransitionPhase {
    /// 是否处于加锁区间
    pub fn holds_lock(&self) -> bool {
        !matches!(self, TransitionPhase::Idle | TransitionPhase::Validating)
    }

    /// 阶段名
    pub fn name(&self) -> &'static str {
        match self {
            TransitionPhase::Idle => "Idle",
            TransitionPhase::Validating => "Validating",
            TransitionPhase::FreezingActor => "FreezingActor",
            TransitionPhase::CoveringScreen => "CoveringScreen",
            TransitionPhase::Relocating => "Relocating",
            TransitionPhase::Holding => "Holding",
            TransitionPhase::UncoveringScreen => "UncoveringScreen",
            TransitionPhase::Restoring => "Restoring",
        }
    }
}

impl std::fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 过渡结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionOutcome {
    /// 正常完成
    Completed,
    /// 失败
    Failed { reason: ErrorKind },
}

impl TransitionOutcome {
    /// 创建失败结果
    pub fn failed(reason: ErrorKind) -> Self {
        Self::Failed { reason }
    }

    /// 是否成功
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// 失败原因
    pub fn failure(&self) -> Option<ErrorKind> {
        match self {
            Self::Completed => None,
            Self::Failed { reason } => Some(*reason),
        }
    }
}

impl From<&TransitionError> for TransitionOutcome {
    fn from(err: &TransitionError) -> Self {
        Self::failed(err.kind())
    }
}

impl From<TransitionError> for TransitionOutcome {
    fn from(err: TransitionError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("Completed"),
            Self::Failed { reason } => write!(f, "Failed({reason})"),
        }
    }
}

/// 过渡序号（进程内递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub(crate) u64);

impl TransitionId {
    /// 获取内部值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TransitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 一次过渡结束时产出的报告
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReport {
    /// 过渡序号
    pub id: TransitionId,
    /// 结果
    pub outcome: TransitionOutcome,
    /// 失败详情（成功时为 None）
    pub error: Option<TransitionError>,
    /// 从提交到结束经过的时间（秒）
    pub elapsed: f32,
}
