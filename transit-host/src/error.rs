//! Host 错误类型

use thiserror::Error;
use transit_runtime::{ConfigError, TransitionError};

/// 会话错误
#[derive(Error, Debug)]
pub enum SessionError {
    /// 配置无效
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 过渡请求被拒绝
    #[error("过渡请求被拒绝: {0}")]
    Transition(#[from] TransitionError),
}
