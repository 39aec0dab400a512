//! 跟随摄像机

use std::cell::RefCell;
use std::rc::Rc;

use transit_runtime::{CameraRig, Vec2};

#[derive(Debug)]
struct CameraData {
    position: Vec2,
    offset: Vec2,
    following: bool,
}

/// 以固定偏移跟随角色的摄像机（共享句柄）
#[derive(Debug, Clone)]
pub struct FollowCamera {
    inner: Rc<RefCell<CameraData>>,
}

impl FollowCamera {
    /// 创建摄像机，初始位置为 `target + offset`
    pub fn new(target: Vec2, offset: Vec2, following: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CameraData {
                position: target + offset,
                offset,
                following,
            })),
        }
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        self.inner.borrow().position
    }

    /// 跟随偏移
    pub fn offset(&self) -> Vec2 {
        self.inner.borrow().offset
    }

    /// 是否跟随
    pub fn is_following(&self) -> bool {
        self.inner.borrow().following
    }

    /// 开启 / 关闭跟随
    pub fn set_following(&self, following: bool) {
        self.inner.borrow_mut().following = following;
    }

    /// 跟随目标
    pub fn follow(&self, target: Vec2) {
        let mut data = self.inner.borrow_mut();
        if data.following {
            data.position = target + data.offset;
        }
    }
}

impl CameraRig for FollowCamera {
    fn position(&self) -> Vec2 {
        self.inner.borrow().position
    }

    fn set_position(&mut self, position: Vec2) {
        self.inner.borrow_mut().position = position;
    }
}
