//! # World 模块
//!
//! 内存中的世界分区，实现 [`WorldLoader`]。
//!
//! ## 模拟规则
//!
//! - 每个世界按配置的 `load_time` 模拟流式加载，`fails` 为真时加载失败
//! - 对象归属于某个世界；替换加载完成时卸载旧世界，未标记保留的对象随之销毁
//! - `keeps_actor` 为假的世界在到达时销毁角色（模拟目标世界清理了外来对象）
//! - 加载失败时旧世界保持不变

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, info, warn};
use transit_runtime::{LoadHandle, PersistentObject, WorldId, WorldLoader};

use crate::config::WorldEntry;

/// 加载计时的容差（秒）
const LOAD_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
struct ObjectRecord {
    owner: WorldId,
    alive: bool,
}

#[derive(Debug)]
struct RegistryData {
    worlds: HashMap<WorldId, WorldEntry>,
    current: WorldId,
    objects: HashMap<PersistentObject, ObjectRecord>,
    persistent: HashSet<PersistentObject>,
    loads: usize,
}

impl RegistryData {
    /// 卸载当前世界并切换到 `world_id`
    fn replace_with(&mut self, world_id: &WorldId) {
        let previous = std::mem::replace(&mut self.current, world_id.clone());
        for (object, record) in self.objects.iter_mut() {
            if record.alive && record.owner == previous && !self.persistent.contains(object) {
                record.alive = false;
                debug!(object = ?object, world = %previous, "对象随世界卸载");
            }
        }

        let keeps_actor = self
            .worlds
            .get(world_id)
            .is_none_or(|entry| entry.keeps_actor);
        if !keeps_actor && let Some(record) = self.objects.get_mut(&PersistentObject::Actor) {
            record.alive = false;
            warn!(world = %world_id, "目标世界销毁了角色");
        }

        self.loads += 1;
        info!(from = %previous, to = %world_id, "世界已替换");
    }
}

/// 世界注册表（共享句柄）
#[derive(Debug, Clone)]
pub struct WorldRegistry {
    inner: Rc<RefCell<RegistryData>>,
}

impl WorldRegistry {
    /// 用世界列表创建注册表，`start` 为初始已加载的世界
    pub fn new(worlds: &[WorldEntry], start: WorldId) -> Self {
        let worlds = worlds
            .iter()
            .map(|entry| (entry.id.clone(), entry.clone()))
            .collect();
        Self {
            inner: Rc::new(RefCell::new(RegistryData {
                worlds,
                current: start,
                objects: HashMap::new(),
                persistent: HashSet::new(),
                loads: 0,
            })),
        }
    }

    /// 在当前世界生成对象
    pub fn spawn(&self, object: PersistentObject) {
        let mut data = self.inner.borrow_mut();
        let owner = data.current.clone();
        data.objects.insert(object, ObjectRecord { owner, alive: true });
    }

    /// 当前已加载的世界
    pub fn current(&self) -> WorldId {
        self.inner.borrow().current.clone()
    }

    /// 对象所属世界（已销毁或未生成时为 `None`）
    pub fn owner_of(&self, object: PersistentObject) -> Option<WorldId> {
        let data = self.inner.borrow();
        data.objects
            .get(&object)
            .filter(|record| record.alive)
            .map(|record| record.owner.clone())
    }

    /// 对象是否带有保留标记
    pub fn is_marked(&self, object: PersistentObject) -> bool {
        self.inner.borrow().persistent.contains(&object)
    }

    /// 完成的替换加载次数
    pub fn load_count(&self) -> usize {
        self.inner.borrow().loads
    }
}

impl WorldLoader for WorldRegistry {
    fn is_registered(&self, world_id: &WorldId) -> bool {
        self.inner.borrow().worlds.contains_key(world_id)
    }

    fn load_replacing(&mut self, world_id: &WorldId) -> Option<Box<dyn LoadHandle>> {
        let entry = self.inner.borrow().worlds.get(world_id).cloned()?;
        debug!(world = %world_id, load_time = entry.load_time, "开始流式加载");
        Some(Box::new(StreamingHandle {
            registry: Rc::clone(&self.inner),
            world_id: world_id.clone(),
            load_time: entry.load_time.max(0.0),
            fails: entry.fails,
            elapsed: 0.0,
            state: StreamState::Streaming,
        }))
    }

    fn mark_persistent(&mut self, object: PersistentObject) {
        self.inner.borrow_mut().persistent.insert(object);
    }

    fn clear_persistent(&mut self, object: PersistentObject) {
        self.inner.borrow_mut().persistent.remove(&object);
    }

    fn adopt(&mut self, object: PersistentObject, world_id: &WorldId) {
        if let Some(record) = self.inner.borrow_mut().objects.get_mut(&object) {
            record.owner = world_id.clone();
        }
    }

    fn is_alive(&self, object: PersistentObject) -> bool {
        self.inner
            .borrow()
            .objects
            .get(&object)
            .is_some_and(|record| record.alive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Streaming,
    Done,
    Failed,
}

/// 模拟的流式加载句柄
#[derive(Debug)]
pub struct StreamingHandle {
    registry: Rc<RefCell<RegistryData>>,
    world_id: WorldId,
    load_time: f32,
    fails: bool,
    elapsed: f32,
    state: StreamState,
}

impl LoadHandle for StreamingHandle {
    fn update(&mut self, dt: f32) {
        if self.state != StreamState::Streaming {
            return;
        }
        self.elapsed += dt;
        if self.elapsed + LOAD_EPSILON < self.load_time {
            return;
        }

        if self.fails {
            warn!(world = %self.world_id, "世界加载失败");
            self.state = StreamState::Failed;
        } else {
            self.registry.borrow_mut().replace_with(&self.world_id);
            self.state = StreamState::Done;
        }
    }

    fn is_done(&self) -> bool {
        self.state == StreamState::Done
    }

    fn progress(&self) -> f32 {
        match self.state {
            StreamState::Done => 1.0,
            _ if self.load_time <= 0.0 => 0.0,
            _ => (self.elapsed / self.load_time).clamp(0.0, 1.0),
        }
    }

    fn failed(&self) -> bool {
        self.state == StreamState::Failed
    }
}
