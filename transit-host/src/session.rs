//! # Session 模块
//!
//! 游戏会话：按配置组装协作者与编排器，并在每帧驱动它们。
//!
//! ## 帧顺序
//!
//! ```text
//! orchestrator.tick(dt)   推进进行中的过渡
//! actor.update(dt)        应用移动输入（禁用时忽略）
//! camera.follow()         无过渡时跟随角色
//! triggers.poll()         当前世界的触发区域检测进入
//! drain_events()          本帧事件覆盖上一帧的
//! ```
//!
//! 触发器提交后本帧不再检测其余区域；如果过渡在提交时已同步完成，
//! 到达点所在的区域只同步占用状态，不会在下一帧触发。

use tracing::{info, warn};
use transit_runtime::{
    CameraRig, Collaborators, PersistentObject, TransitionConfig, TransitionEvent,
    TransitionOrchestrator, TransitionReport, TransitionRequest, TransitionTicket,
    TransitionTrigger, Vec2, WorldId,
};

use crate::actor::PlayerActor;
use crate::audio::CueQueue;
use crate::camera::FollowCamera;
use crate::config::{HostConfig, ZoneEntry};
use crate::error::SessionError;
use crate::fader::ScreenFader;
use crate::world::WorldRegistry;

/// 游戏会话
pub struct GameSession {
    orchestrator: TransitionOrchestrator,
    /// (所在世界, 触发器)
    triggers: Vec<(WorldId, TransitionTrigger)>,
    actor: PlayerActor,
    camera: Option<FollowCamera>,
    fader: ScreenFader,
    worlds: WorldRegistry,
    audio: CueQueue,
    frame: u64,
    history: Vec<TransitionReport>,
    /// 本帧取出的过渡事件
    events: Vec<TransitionEvent>,
}

impl GameSession {
    /// 按配置创建会话
    pub fn new(config: &HostConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let worlds = WorldRegistry::new(&config.worlds, config.start_world.clone());
        let actor = PlayerActor::new(config.actor.spawn, config.actor.speed);
        worlds.spawn(PersistentObject::Actor);

        let camera = config.camera.enabled.then(|| {
            worlds.spawn(PersistentObject::Camera);
            FollowCamera::new(config.actor.spawn, config.camera.offset, config.camera.follow)
        });

        let fader = ScreenFader::new();
        let audio = CueQueue::new(config.audio.muted);

        let collaborators = Collaborators {
            effects: Box::new(fader.clone()),
            loader: Box::new(worlds.clone()),
            actor: Box::new(actor.clone()),
            camera: camera
                .clone()
                .map(|camera| Box::new(camera) as Box<dyn CameraRig>),
            audio: Box::new(audio.clone()),
        };
        let orchestrator = TransitionOrchestrator::new(collaborators, config.transition.clone());

        let triggers = config
            .zones
            .iter()
            .map(|zone| (zone.world.clone(), build_trigger(zone, &config.transition)))
            .collect::<Vec<_>>();

        info!(
            start_world = %config.start_world,
            worlds = config.worlds.len(),
            zones = triggers.len(),
            camera = camera.is_some(),
            "会话已创建"
        );

        Ok(Self {
            orchestrator,
            triggers,
            actor,
            camera,
            fader,
            worlds,
            audio,
            frame: 0,
            history: Vec::new(),
            events: Vec::new(),
        })
    }

    /// 推进一帧
    ///
    /// `input` 为本帧的移动方向。返回本帧结束的过渡报告。
    pub fn update(&mut self, input: Vec2, dt: f32) -> Option<TransitionReport> {
        self.frame += 1;

        let report = self.orchestrator.tick(dt);
        if let Some(report) = &report {
            match &report.error {
                None => info!(id = %report.id, frame = self.frame, "到达目的地"),
                Some(error) => warn!(id = %report.id, frame = self.frame, error = %error, "过渡失败"),
            }
            self.history.push(report.clone());
        }

        self.actor.set_input(input);
        self.actor.update(dt);

        if let Some(camera) = &self.camera
            && !self.orchestrator.is_transitioning()
        {
            camera.follow(self.actor.position());
        }

        let current = self.worlds.current();
        let mut submitted = false;
        for (world, trigger) in &mut self.triggers {
            if *world != current {
                continue;
            }
            match trigger.poll(self.actor.position(), &mut self.orchestrator) {
                Some(Ok(ticket)) => {
                    info!(trigger = trigger.name(), id = %ticket.id(), "触发区域提交过渡");
                    submitted = true;
                    break;
                }
                Some(Err(e)) => {
                    warn!(trigger = trigger.name(), error = %e, "触发区域提交失败");
                }
                None => {}
            }
        }
        if submitted {
            // 提交可能已同步完成并移动了角色
            let current = self.worlds.current();
            let position = self.actor.position();
            for (world, trigger) in &mut self.triggers {
                if *world == current {
                    trigger.settle(position);
                }
            }
        }

        self.events = self.orchestrator.drain_events();
        report
    }

    /// 直接提交过渡（脚本 / 调试用）
    pub fn travel(&mut self, request: TransitionRequest) -> Result<TransitionTicket, SessionError> {
        Ok(self.orchestrator.submit(request)?)
    }

    /// 最近一帧取出的过渡事件
    ///
    /// 包含上一帧之后由 [`travel`](Self::travel) 提交产生的事件。
    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    /// 当前世界
    pub fn current_world(&self) -> WorldId {
        self.worlds.current()
    }

    /// 已经过的帧数
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 已结束的过渡报告
    pub fn history(&self) -> &[TransitionReport] {
        &self.history
    }

    pub fn orchestrator(&self) -> &TransitionOrchestrator {
        &self.orchestrator
    }

    pub fn actor(&self) -> &PlayerActor {
        &self.actor
    }

    pub fn camera(&self) -> Option<&FollowCamera> {
        self.camera.as_ref()
    }

    pub fn fader(&self) -> &ScreenFader {
        &self.fader
    }

    pub fn worlds(&self) -> &WorldRegistry {
        &self.worlds
    }

    pub fn audio(&self) -> &CueQueue {
        &self.audio
    }
}

/// 由区域条目构造触发器
///
/// 条目未覆盖效果和停顿时使用配置默认值。
fn build_trigger(zone: &ZoneEntry, config: &TransitionConfig) -> TransitionTrigger {
    if zone.effect.is_none() && zone.post_cover_delay.is_none() {
        return TransitionTrigger::new(
            zone.name.clone(),
            zone.rect(),
            zone.destination.clone(),
            zone.cues.clone(),
            config,
        );
    }

    let effect = zone
        .effect
        .clone()
        .unwrap_or_else(|| config.default_effect.clone());
    let delay = zone
        .post_cover_delay
        .unwrap_or(config.default_post_cover_delay);
    let template = TransitionRequest::new(zone.destination.clone())
        .with_effect(effect)
        .with_post_cover_delay(delay)
        .with_audio_cues(zone.cues.clone());
    TransitionTrigger::from_template(zone.name.clone(), zone.rect(), template)
}
