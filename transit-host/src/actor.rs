//! # Actor 模块
//!
//! 玩家角色：位置、速度与可操作状态。

use std::cell::RefCell;
use std::rc::Rc;

use transit_runtime::{ActorMobility, Vec2};

#[derive(Debug)]
struct ActorData {
    position: Vec2,
    velocity: Vec2,
    speed: f32,
    enabled: bool,
}

/// 玩家角色（共享句柄）
///
/// 禁用期间忽略移动输入，也不会积分速度。
#[derive(Debug, Clone)]
pub struct PlayerActor {
    inner: Rc<RefCell<ActorData>>,
}

impl PlayerActor {
    /// 在出生点创建角色
    pub fn new(spawn: Vec2, speed: f32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ActorData {
                position: spawn,
                velocity: Vec2::zero(),
                speed,
                enabled: true,
            })),
        }
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        self.inner.borrow().position
    }

    /// 当前速度
    pub fn velocity(&self) -> Vec2 {
        self.inner.borrow().velocity
    }

    /// 是否接受输入
    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().enabled
    }

    /// 设置移动方向
    ///
    /// 方向向量按 `speed` 缩放为速度；禁用时忽略。
    pub fn set_input(&self, direction: Vec2) {
        let mut data = self.inner.borrow_mut();
        if !data.enabled {
            return;
        }
        data.velocity = direction.scale(data.speed);
    }

    /// 按速度积分位置
    pub fn update(&self, dt: f32) {
        let mut data = self.inner.borrow_mut();
        if !data.enabled {
            return;
        }
        let step = data.velocity.scale(dt);
        data.position = data.position + step;
    }
}

impl ActorMobility for PlayerActor {
    fn disable(&mut self) {
        self.inner.borrow_mut().enabled = false;
    }

    fn enable(&mut self) {
        self.inner.borrow_mut().enabled = true;
    }

    fn zero_velocity(&mut self) {
        self.inner.borrow_mut().velocity = Vec2::zero();
    }

    fn position(&self) -> Vec2 {
        self.inner.borrow().position
    }

    fn set_position(&mut self, position: Vec2) {
        self.inner.borrow_mut().position = position;
    }
}
