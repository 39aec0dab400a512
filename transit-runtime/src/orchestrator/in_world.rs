//! 世界内移动与摄像机偏移保持

use tracing::debug;

use super::engine::{Stage, Step, TransitionOrchestrator};
use crate::geometry::Vec2;

impl TransitionOrchestrator {
    /// 世界内移动：直接设置位置后进入停顿
    pub(super) fn relocate_in_world(&mut self, position: Vec2) -> Step {
        self.reposition(position, true);
        self.enter(Stage::Holding { elapsed: 0.0 });
        Step::Continue
    }

    /// 移动角色，并让摄像机保持移动前的相对偏移
    ///
    /// 偏移在移动前一刻采样，移动后立即以 `新位置 + 偏移` 重新应用。
    /// `move_camera` 为 false 时摄像机保持不动。
    pub(super) fn reposition(&mut self, target: Vec2, move_camera: bool) {
        let actor = &mut self.collaborators.actor;
        let from = actor.position();
        let offset = self
            .collaborators
            .camera
            .as_ref()
            .filter(|_| move_camera)
            .map(|camera| camera.position() - from);

        actor.set_position(target);

        if let (Some(camera), Some(offset)) = (self.collaborators.camera.as_mut(), offset) {
            camera.set_position(target + offset);
        }

        if let Some(active) = self.active.as_ref()
            && active.verbose
        {
            debug!(
                id = %active.id,
                from = %from,
                to = %target,
                camera_offset = ?offset,
                "角色已移动"
            );
        }
    }
}
