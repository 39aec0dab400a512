//! # Error 模块
//!
//! 定义 transit-runtime 中使用的错误类型。
//!
//! 所有错误最终都会折叠为 [`ErrorKind`]，通过 `TransitionOutcome` 交还给提交者；
//! 编排器内部不会向外抛出无法处理的错误。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::WorldId;

/// 过渡失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// 请求不合法（目标无效或缺少效果），在加锁前拒绝
    InvalidRequest,
    /// 已有过渡在执行
    AlreadyInProgress,
    /// 世界加载失败
    LoadFailed,
    /// 跨世界加载后角色丢失
    ActorLost,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::AlreadyInProgress => "AlreadyInProgress",
            ErrorKind::LoadFailed => "LoadFailed",
            ErrorKind::ActorLost => "ActorLost",
        };
        f.write_str(name)
    }
}

/// 请求校验失败的具体原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidRequestReason {
    /// 未指定遮罩效果
    #[error("缺少遮罩效果")]
    MissingEffect,

    /// 效果时长非法
    #[error("效果时长无效: {0}")]
    InvalidEffectDuration(f32),

    /// 遮罩颜色分量超出 0.0 - 1.0
    #[error("遮罩颜色分量超出范围")]
    InvalidCoverColor,

    /// 目标位置不是有限值
    #[error("目标位置无效: ({x}, {y})")]
    NonFinitePosition { x: f32, y: f32 },

    /// 世界 ID 为空
    #[error("世界 ID 为空")]
    EmptyWorldId,

    /// 世界未在加载器中注册
    #[error("世界 '{0}' 未注册")]
    UnknownWorld(WorldId),

    /// 遮盖后停顿时长非法
    #[error("停顿时长无效: {0}")]
    InvalidDelay(f32),
}

/// 世界加载失败的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// 加载器没有返回句柄
    #[error("加载器未返回句柄")]
    NoHandle,

    /// 句柄报告失败
    #[error("加载句柄报告失败")]
    HandleFailed,
}

/// 过渡错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// 请求校验失败
    #[error("无效的过渡请求: {0}")]
    InvalidRequest(#[from] InvalidRequestReason),

    /// 已有过渡在执行
    #[error("已有过渡正在执行")]
    AlreadyInProgress,

    /// 世界加载失败
    #[error("加载世界 '{world_id}' 失败: {cause}")]
    LoadFailed { world_id: WorldId, cause: LoadFailure },

    /// 加载后角色不可达
    #[error("加载世界 '{world_id}' 后角色丢失")]
    ActorLost { world_id: WorldId },
}

impl TransitionError {
    /// 对应的失败分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransitionError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            TransitionError::AlreadyInProgress => ErrorKind::AlreadyInProgress,
            TransitionError::LoadFailed { .. } => ErrorKind::LoadFailed,
            TransitionError::ActorLost { .. } => ErrorKind::ActorLost,
        }
    }
}

/// Result 类型别名
pub type TransitionResult<T> = Result<T, TransitionError>;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读写失败
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析或序列化失败
    #[error("配置格式错误: {0}")]
    Format(#[from] serde_json::Error),

    /// 配置值不合法
    #[error("配置验证失败: {0}")]
    Validation(String),
}
