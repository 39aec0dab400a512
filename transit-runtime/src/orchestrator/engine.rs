//! # Engine 模块
//!
//! 过渡编排器核心：单飞锁 + 显式阶段状态机。
//!
//! ## 执行模型
//!
//! ```text
//! submit(request) -> Result<TransitionTicket, TransitionError>
//! tick(dt)        -> Option<TransitionReport>
//! ```
//!
//! 1. `submit` 先检查锁，再校验请求；任一失败立即返回，不产生任何副作用
//! 2. 通过后加锁，冻结角色并开始遮盖屏幕，直到第一个等待点才返回
//! 3. Host 每帧调用 `tick(dt)`，编排器推进等待中的阶段；
//!    不需要等待的阶段在同一次调用内连续执行
//! 4. 进入终态时先释放锁，再写入票据并产出报告

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::lock::{TransitionLock, TransitionProbe, TransitionTicket};
use crate::collaborators::{Collaborators, LoadHandle, PersistentObject};
use crate::config::TransitionConfig;
use crate::effect::TransitionEffect;
use crate::error::{TransitionError, TransitionResult};
use crate::event::TransitionEvent;
use crate::request::{CueSlot, TransitionRequest, WorldId};
use crate::state::{TransitionId, TransitionOutcome, TransitionPhase, TransitionReport};

/// 帧时间累加的容差（秒）
pub(super) const TIME_EPSILON: f32 = 1e-4;

/// 未取走事件的上限，超出时丢弃最旧的
pub const MAX_PENDING_EVENTS: usize = 256;

/// 内部阶段
///
/// 比 `TransitionPhase` 多携带等待所需的数据。
pub(super) enum Stage {
    Idle,
    CoveringScreen,
    Relocating,
    Loading {
        world_id: WorldId,
        handle: Box<dyn LoadHandle>,
    },
    Holding {
        elapsed: f32,
    },
    UncoveringScreen,
    Restoring,
}

impl Stage {
    fn phase(&self) -> TransitionPhase {
        match self {
            Stage::Idle => TransitionPhase::Idle,
            Stage::CoveringScreen => TransitionPhase::CoveringScreen,
            Stage::Relocating | Stage::Loading { .. } => TransitionPhase::Relocating,
            Stage::Holding { .. } => TransitionPhase::Holding,
            Stage::UncoveringScreen => TransitionPhase::UncoveringScreen,
            Stage::Restoring => TransitionPhase::Restoring,
        }
    }
}

/// 单步推进结果
pub(super) enum Step {
    /// 阶段已切换，可以立即继续
    Continue,
    /// 需要等待下一帧
    Suspend,
}

/// 正在执行的过渡
pub(super) struct ActiveTransition {
    pub(super) id: TransitionId,
    pub(super) request: TransitionRequest,
    pub(super) effect: TransitionEffect,
    pub(super) ticket: TransitionTicket,
    /// 中止原因（存在时跳过移动和到达音效）
    pub(super) failure: Option<TransitionError>,
    /// 当前仍带有保留标记的对象
    pub(super) persisted: Vec<PersistentObject>,
    pub(super) elapsed: f32,
    pub(super) verbose: bool,
}

/// 过渡编排器
///
/// 进程内唯一，整个游戏会话期间存活。
///
/// # 使用示例
///
/// ```ignore
/// let mut orchestrator = TransitionOrchestrator::new(collaborators, config);
/// let ticket = orchestrator.submit(request)?;
///
/// loop {
///     if let Some(report) = orchestrator.tick(dt) {
///         // 过渡结束
///     }
/// }
/// ```
pub struct TransitionOrchestrator {
    pub(super) collaborators: Collaborators,
    config: TransitionConfig,
    lock: TransitionLock,
    pub(super) stage: Stage,
    pub(super) active: Option<ActiveTransition>,
    next_id: u64,
    pub(super) events: Vec<TransitionEvent>,
    finished: VecDeque<TransitionReport>,
}

impl TransitionOrchestrator {
    /// 创建编排器
    pub fn new(collaborators: Collaborators, config: TransitionConfig) -> Self {
        Self {
            collaborators,
            config,
            lock: TransitionLock::new(),
            stage: Stage::Idle,
            active: None,
            next_id: 1,
            events: Vec::new(),
            finished: VecDeque::new(),
        }
    }

    /// 提交过渡请求
    ///
    /// # 返回
    ///
    /// - `Ok(ticket)`: 已加锁并开始执行
    /// - `Err(AlreadyInProgress)`: 已有过渡在执行，未调用任何协作者
    /// - `Err(InvalidRequest)`: 请求无效，未加锁
    pub fn submit(&mut self, request: TransitionRequest) -> TransitionResult<TransitionTicket> {
        if self.lock.is_held() {
            warn!(
                active = ?self.active.as_ref().map(|a| a.id),
                "已有过渡正在执行，拒绝新请求"
            );
            return Err(TransitionError::AlreadyInProgress);
        }

        // Validating：同步完成，不对外可见
        let loader = &self.collaborators.loader;
        let effect = match request.validate(|id| loader.is_registered(id)) {
            Ok(effect) => effect.clone(),
            Err(reason) => {
                warn!(reason = %reason, "过渡请求无效");
                return Err(reason.into());
            }
        };

        if !self.lock.try_acquire() {
            return Err(TransitionError::AlreadyInProgress);
        }

        let id = TransitionId(self.next_id);
        self.next_id += 1;
        let ticket = TransitionTicket::new(id);
        let verbose = request.debug || self.config.trace_phases;
        let cross_world = request.destination.is_cross_world();

        info!(
            id = %id,
            destination = ?request.destination,
            duration = effect.duration,
            "开始过渡"
        );

        self.active = Some(ActiveTransition {
            id,
            request,
            effect,
            ticket: ticket.clone(),
            failure: None,
            persisted: Vec::new(),
            elapsed: 0.0,
            verbose,
        });
        self.events.push(TransitionEvent::Started { id, cross_world });

        self.freeze_actor();
        self.enter(Stage::CoveringScreen);
        self.advance(0.0);

        Ok(ticket)
    }

    /// 每帧驱动
    ///
    /// 返回本帧（或之前同步完成的）过渡报告。
    pub fn tick(&mut self, dt: f32) -> Option<TransitionReport> {
        if let Some(active) = self.active.as_mut() {
            active.elapsed += dt;
            self.advance(dt);
        }
        self.finished.pop_front()
    }

    /// 是否有过渡正在执行
    pub fn is_transitioning(&self) -> bool {
        self.lock.is_held()
    }

    /// 创建锁探针
    pub fn probe(&self) -> TransitionProbe {
        self.lock.probe()
    }

    /// 当前阶段
    pub fn phase(&self) -> TransitionPhase {
        self.stage.phase()
    }

    /// 当前过渡序号
    pub fn active_id(&self) -> Option<TransitionId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// 配置
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// 取出累积的事件
    pub fn drain_events(&mut self) -> Vec<TransitionEvent> {
        std::mem::take(&mut self.events)
    }

    /// 尚未取走的事件数
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ========== 阶段驱动 ==========

    fn advance(&mut self, mut dt: f32) {
        loop {
            match self.step(dt) {
                Step::Continue => dt = 0.0,
                Step::Suspend => break,
            }
        }
        self.trim_events();
    }

    /// Host 不取事件时只保留最近的 `MAX_PENDING_EVENTS` 条
    fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess > 0 {
            debug!(dropped = excess, "事件未被取走，丢弃最旧的");
            self.events.drain(..excess);
        }
    }

    fn step(&mut self, dt: f32) -> Step {
        match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Idle => Step::Suspend,
            Stage::CoveringScreen => {
                let effects = &mut self.collaborators.effects;
                effects.update(dt);
                if effects.is_playing() {
                    self.stage = Stage::CoveringScreen;
                    return Step::Suspend;
                }
                self.enter(Stage::Relocating);
                Step::Continue
            }
            Stage::Relocating => self.relocate(),
            Stage::Loading { world_id, handle } => self.poll_world_load(world_id, handle, dt),
            Stage::Holding { elapsed } => {
                let elapsed = elapsed + dt;
                let delay = self
                    .active
                    .as_ref()
                    .map_or(0.0, |a| a.request.post_cover_delay);
                if elapsed + TIME_EPSILON < delay {
                    self.stage = Stage::Holding { elapsed };
                    return Step::Suspend;
                }
                self.enter(Stage::UncoveringScreen);
                Step::Continue
            }
            Stage::UncoveringScreen => {
                let effects = &mut self.collaborators.effects;
                effects.update(dt);
                if effects.is_playing() {
                    self.stage = Stage::UncoveringScreen;
                    return Step::Suspend;
                }
                if self.active.as_ref().is_some_and(|a| a.failure.is_none()) {
                    self.play_cue(CueSlot::OnArrival);
                }
                self.enter(Stage::Restoring);
                Step::Continue
            }
            Stage::Restoring => {
                self.collaborators.actor.enable();
                self.finish();
                Step::Suspend
            }
        }
    }

    /// 进入新阶段并执行入口动作
    pub(super) fn enter(&mut self, stage: Stage) {
        let phase = stage.phase();
        debug_assert!(phase.holds_lock(), "阶段 {phase} 不持锁，不能由 enter 进入");
        self.stage = stage;

        let Some(active) = self.active.as_ref() else {
            return;
        };
        let id = active.id;
        if active.verbose {
            debug!(id = %id, phase = %phase, elapsed = active.elapsed, "进入阶段");
        }
        self.events.push(TransitionEvent::PhaseEntered { id, phase });

        match phase {
            TransitionPhase::CoveringScreen => {
                self.play_cue(CueSlot::OnStart);
                if let Some(active) = self.active.as_ref() {
                    self.collaborators.effects.cover_screen(&active.effect);
                }
            }
            TransitionPhase::Holding => {
                self.play_cue(CueSlot::OnMidpoint);
            }
            TransitionPhase::UncoveringScreen => {
                if let Some(active) = self.active.as_ref() {
                    self.collaborators.effects.uncover_screen(&active.effect);
                }
            }
            _ => {}
        }
    }

    /// FreezingActor：禁止移动并清零速度
    fn freeze_actor(&mut self) {
        if let Some(active) = self.active.as_ref() {
            self.events.push(TransitionEvent::PhaseEntered {
                id: active.id,
                phase: TransitionPhase::FreezingActor,
            });
        }
        let actor = &mut self.collaborators.actor;
        actor.disable();
        actor.zero_velocity();
    }

    /// Relocating：按目标类型分派
    fn relocate(&mut self) -> Step {
        let Some(active) = self.active.as_ref() else {
            return Step::Suspend;
        };
        let destination = active.request.destination.clone();

        match destination.world_id() {
            None => self.relocate_in_world(destination.position()),
            Some(world_id) => self.start_world_load(world_id.clone()),
        }
    }

    /// 播放指定插槽的音效（如果有）
    pub(super) fn play_cue(&mut self, slot: CueSlot) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if let Some(cue) = active.request.audio_cues.get(slot) {
            if active.verbose {
                debug!(id = %active.id, slot = ?slot, cue = %cue, "播放音效");
            }
            self.collaborators.audio.play(cue);
            self.events.push(TransitionEvent::CuePlayed { id: active.id, slot });
        }
    }

    /// 中止当前过渡：清理保留标记，揭开屏幕并恢复控制
    pub(super) fn abort(&mut self, error: TransitionError) -> Step {
        warn!(
            id = ?self.active.as_ref().map(|a| a.id),
            error = %error,
            "过渡中止，恢复可操作状态"
        );
        self.release_persistence();
        if let Some(active) = self.active.as_mut() {
            active.failure = Some(error);
        }
        self.enter(Stage::UncoveringScreen);
        Step::Continue
    }

    /// 终态：释放锁，写入结果
    fn finish(&mut self) {
        self.stage = Stage::Idle;
        let Some(active) = self.active.take() else {
            self.lock.release();
            return;
        };

        let outcome = match &active.failure {
            None => TransitionOutcome::Completed,
            Some(error) => TransitionOutcome::from(error),
        };

        self.lock.release();

        active.ticket.resolve(outcome);
        self.events.push(TransitionEvent::Finished {
            id: active.id,
            outcome,
        });
        match &active.failure {
            None => info!(id = %active.id, elapsed = active.elapsed, "过渡完成"),
            Some(error) => warn!(id = %active.id, error = %error, "过渡失败"),
        }
        self.finished.push_back(TransitionReport {
            id: active.id,
            outcome,
            error: active.failure,
            elapsed: active.elapsed,
        });
    }
}

impl std::fmt::Debug for TransitionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionOrchestrator")
            .field("phase", &self.phase())
            .field("active", &self.active_id())
            .field("is_transitioning", &self.is_transitioning())
            .field("pending_events", &self.events.len())
            .finish()
    }
}
