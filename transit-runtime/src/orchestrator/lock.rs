//! # Lock 模块
//!
//! 单飞锁与结果票据。
//!
//! 锁只有一个原子布尔值，由编排器独占写入；`TransitionProbe` 是只读副本，
//! 供触发器和 UI 随时轮询。

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::state::{TransitionId, TransitionOutcome};

/// 过渡锁
#[derive(Debug, Default)]
pub struct TransitionLock {
    held: Arc<AtomicBool>,
}

impl TransitionLock {
    /// 创建未持有的锁
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试获取锁，已被持有时返回 false
    pub(crate) fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 释放锁
    pub(crate) fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    /// 锁是否被持有
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// 创建只读探针
    pub fn probe(&self) -> TransitionProbe {
        TransitionProbe {
            held: Arc::clone(&self.held),
        }
    }
}

/// 锁的只读探针
#[derive(Debug, Clone)]
pub struct TransitionProbe {
    held: Arc<AtomicBool>,
}

impl TransitionProbe {
    /// 是否有过渡正在执行
    pub fn is_transitioning(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// 提交成功后返回给调用方的票据
///
/// 过渡结束时编排器写入结果；票据本身不持有任何锁。
#[derive(Debug, Clone)]
pub struct TransitionTicket {
    id: TransitionId,
    outcome: Rc<Cell<Option<TransitionOutcome>>>,
}

impl TransitionTicket {
    pub(crate) fn new(id: TransitionId) -> Self {
        Self {
            id,
            outcome: Rc::new(Cell::new(None)),
        }
    }

    /// 过渡序号
    pub fn id(&self) -> TransitionId {
        self.id
    }

    /// 结果（尚未结束时为 None）
    pub fn outcome(&self) -> Option<TransitionOutcome> {
        self.outcome.get()
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.outcome.get().is_some()
    }

    pub(crate) fn resolve(&self, outcome: TransitionOutcome) {
        self.outcome.set(Some(outcome));
    }
}
