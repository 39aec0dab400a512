//! # Cross World 模块
//!
//! 跨世界移动：保留标记、替换加载、加载后归属与重新定位。
//!
//! ## 流程
//!
//! ```text
//! mark_persistent(Actor [, Camera])
//!   → load_replacing(world_id)          (无句柄 → LoadFailed)
//!   → 每帧 update/poll                   (failed → LoadFailed)
//!   → clear_persistent                   (角色不可达 → ActorLost)
//!   → adopt(..., world_id)              (仅存活对象)
//!   → reposition → Holding              (摄像机不可达时不移动摄像机)
//! ```
//!
//! 中止路径同样会清除保留标记，保证过渡结束时不残留任何标记。

use tracing::{debug, warn};

use super::engine::{Stage, Step, TransitionOrchestrator};
use crate::collaborators::{LoadHandle, PersistentObject};
use crate::error::{LoadFailure, TransitionError};
use crate::event::TransitionEvent;
use crate::request::WorldId;

impl TransitionOrchestrator {
    /// 标记保留对象并发起替换加载
    pub(super) fn start_world_load(&mut self, world_id: WorldId) -> Step {
        let mut objects = vec![PersistentObject::Actor];
        if self.collaborators.camera.is_some() {
            objects.push(PersistentObject::Camera);
        }
        for object in &objects {
            self.collaborators.loader.mark_persistent(*object);
        }
        if let Some(active) = self.active.as_mut() {
            active.persisted = objects;
        }

        match self.collaborators.loader.load_replacing(&world_id) {
            Some(handle) => {
                if let Some(active) = self.active.as_ref()
                    && active.verbose
                {
                    debug!(id = %active.id, world = %world_id, "开始加载世界");
                }
                self.stage = Stage::Loading { world_id, handle };
                Step::Continue
            }
            None => self.abort(TransitionError::LoadFailed {
                world_id,
                cause: LoadFailure::NoHandle,
            }),
        }
    }

    /// 轮询加载句柄
    pub(super) fn poll_world_load(
        &mut self,
        world_id: WorldId,
        mut handle: Box<dyn LoadHandle>,
        dt: f32,
    ) -> Step {
        handle.update(dt);

        if handle.failed() {
            return self.abort(TransitionError::LoadFailed {
                world_id,
                cause: LoadFailure::HandleFailed,
            });
        }

        if handle.is_done() {
            return self.finish_world_load(world_id);
        }

        if let Some(active) = self.active.as_ref() {
            self.events.push(TransitionEvent::LoadProgress {
                id: active.id,
                world_id: world_id.clone(),
                progress: handle.progress().clamp(0.0, 1.0),
            });
        }
        self.stage = Stage::Loading { world_id, handle };
        Step::Suspend
    }

    /// 加载完成：清除标记、检查角色、归属新世界、重新定位
    fn finish_world_load(&mut self, world_id: WorldId) -> Step {
        let persisted = self.release_persistence();

        if !self.collaborators.loader.is_alive(PersistentObject::Actor) {
            return self.abort(TransitionError::ActorLost { world_id });
        }

        let mut camera_alive = false;
        for object in persisted {
            if self.collaborators.loader.is_alive(object) {
                self.collaborators.loader.adopt(object, &world_id);
                camera_alive |= object == PersistentObject::Camera;
            } else {
                warn!(object = ?object, world = %world_id, "保留对象在加载后不可达，跳过归属");
            }
        }

        let target = self
            .active
            .as_ref()
            .map(|a| a.request.destination.position());
        if let Some(target) = target {
            // 已销毁的摄像机不再移动
            self.reposition(target, camera_alive);
        }

        self.enter(Stage::Holding { elapsed: 0.0 });
        Step::Continue
    }

    /// 清除本次过渡设置的所有保留标记，返回被清除的对象
    pub(super) fn release_persistence(&mut self) -> Vec<PersistentObject> {
        let persisted = match self.active.as_mut() {
            Some(active) => std::mem::take(&mut active.persisted),
            None => Vec::new(),
        };
        for object in &persisted {
            self.collaborators.loader.clear_persistent(*object);
        }
        persisted
    }
}
