//! # Transit Host
//!
//! 过渡编排的宿主层：为 `transit-runtime` 的协作者接口提供内存实现，
//! 并用 [`GameSession`] 把它们组装进帧循环。
//!
//! ## 模块结构
//!
//! - [`fader`]：全屏遮罩补间
//! - [`world`]：世界分区与模拟流式加载
//! - [`actor`]：玩家角色
//! - [`camera`]：跟随摄像机
//! - [`audio`]：音效队列
//! - [`config`]：会话配置
//! - [`session`]：游戏会话
//!
//! 协作者都是 `Rc<RefCell<..>>` 共享句柄：一份交给编排器驱动，
//! 另一份留在会话里供渲染 / 调试读取。

pub mod actor;
pub mod audio;
pub mod camera;
pub mod config;
pub mod error;
pub mod fader;
pub mod session;
pub mod world;

pub use actor::PlayerActor;
pub use audio::{CueQueue, MAX_PENDING_CUES};
pub use camera::FollowCamera;
pub use config::{ActorConfig, AudioConfig, CameraConfig, HostConfig, WorldEntry, ZoneEntry};
pub use error::SessionError;
pub use fader::{FadePhase, ScreenFader};
pub use session::GameSession;
pub use world::{StreamingHandle, WorldRegistry};
