//! # Trigger 模块
//!
//! 过渡触发区域：检测角色进入区域，并构造、提交一次过渡请求。
//!
//! 触发器只在"进入"的那一帧触发（边沿检测）；角色需要先离开区域才能再次触发。
//! 有过渡在执行时触发器不会提交（礼节性检查，编排器仍会重新校验）。

use tracing::debug;

use crate::config::TransitionConfig;
use crate::error::TransitionResult;
use crate::geometry::{Rect, Vec2};
use crate::orchestrator::{TransitionOrchestrator, TransitionProbe, TransitionTicket};
use crate::request::{AudioCues, Destination, TransitionRequest};

/// 过渡触发器
#[derive(Debug, Clone)]
pub struct TransitionTrigger {
    /// 触发器名称（日志用）
    name: String,
    /// 触发区域
    zone: Rect,
    /// 请求模板
    template: TransitionRequest,
    /// 上一帧角色是否在区域内
    inside: bool,
}

impl TransitionTrigger {
    /// 创建触发器
    ///
    /// 模板请求未指定效果时，使用配置中的默认效果与默认停顿。
    pub fn new(
        name: impl Into<String>,
        zone: Rect,
        destination: Destination,
        cues: AudioCues,
        config: &TransitionConfig,
    ) -> Self {
        let template = TransitionRequest::new(destination)
            .with_effect(config.default_effect.clone())
            .with_post_cover_delay(config.default_post_cover_delay)
            .with_audio_cues(cues);
        Self::from_template(name, zone, template)
    }

    /// 使用完整请求模板创建触发器
    pub fn from_template(name: impl Into<String>, zone: Rect, template: TransitionRequest) -> Self {
        Self {
            name: name.into(),
            zone,
            template,
            inside: false,
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 区域
    pub fn zone(&self) -> Rect {
        self.zone
    }

    /// 请求模板
    pub fn template(&self) -> &TransitionRequest {
        &self.template
    }

    /// 角色当前是否在区域内（以最近一次观测为准）
    pub fn is_occupied(&self) -> bool {
        self.inside
    }

    /// 观测角色位置
    ///
    /// 角色本帧刚进入区域且没有过渡在执行时，返回要提交的请求。
    pub fn observe(&mut self, actor_position: Vec2, probe: &TransitionProbe) -> Option<TransitionRequest> {
        let inside = self.zone.contains(actor_position);
        let entered = inside && !self.inside;
        self.inside = inside;

        if !entered {
            return None;
        }
        if probe.is_transitioning() {
            debug!(trigger = %self.name, "过渡进行中，忽略触发");
            return None;
        }

        debug!(trigger = %self.name, position = %actor_position, "角色进入触发区域");
        Some(self.template.clone())
    }

    /// 只同步占用状态，不触发
    ///
    /// 用于角色被过渡直接放进区域的情况：到达点的区域视为已进入，
    /// 需要离开后再进入才会触发。
    pub fn settle(&mut self, actor_position: Vec2) {
        self.inside = self.zone.contains(actor_position);
    }

    /// 观测并直接提交给编排器
    pub fn poll(
        &mut self,
        actor_position: Vec2,
        orchestrator: &mut TransitionOrchestrator,
    ) -> Option<TransitionResult<TransitionTicket>> {
        let probe = orchestrator.probe();
        self.observe(actor_position, &probe)
            .map(|request| orchestrator.submit(request))
    }
}
