//! 领域错误定义：
//! - `GalaxyError` 覆盖输入校验、前置条件、外部工具与 IO 失败
//! - `ErrorKind` 将具体错误归类，便于命令层决定提示方式

use std::{fmt, io, path::PathBuf};
use thiserror::Error;

use crate::external::ExternalStep;

/// 错误大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    InvalidInput,
    PreconditionFailed,
    ExternalToolFailure,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::PreconditionFailed => "precondition failed",
            ErrorKind::ExternalToolFailure => "external tool failure",
            ErrorKind::Io => "io failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub(crate) enum GalaxyError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid color '{0}': please enter a valid hex color")]
    InvalidColor(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("Not in a Galaxy project directory ({} not found)", .0.display())]
    NotAProject(PathBuf),

    #[error("Feature with ID '{0}' already exists")]
    DuplicateFeature(String),

    #[error("This command is only for {expected} apps (found a {found} app)")]
    WrongAppType { expected: String, found: String },

    #[error("Invalid galaxy config: {0}")]
    InvalidConfig(String),

    #[error("{step} failed: {message}")]
    ExternalTool { step: ExternalStep, message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl GalaxyError {
    /// 归类到错误大类
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            GalaxyError::InvalidInput(_) | GalaxyError::InvalidColor(_) => ErrorKind::InvalidInput,
            GalaxyError::PreconditionFailed(_)
            | GalaxyError::NotAProject(_)
            | GalaxyError::DuplicateFeature(_)
            | GalaxyError::WrongAppType { .. }
            | GalaxyError::InvalidConfig(_) => ErrorKind::PreconditionFailed,
            GalaxyError::ExternalTool { .. } => ErrorKind::ExternalToolFailure,
            GalaxyError::Io { .. } => ErrorKind::Io,
        }
    }

    /// 包装 IO 错误并附带上下文
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        GalaxyError::Io { context: context.into(), source }
    }
}

pub(crate) type GalaxyResult<T> = Result<T, GalaxyError>;
