//! 统一错误处理模块
//!
//! 提供引擎范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **原生层错误** (`NativeError`): 子系统、参数解码器、对象包装层产生的错误，
//!   必须经过异常重映射 (`ScriptRuntime::raise_native`) 才能进入脚本。
//! - **驱动层错误** (`EngineError`): 顶层驱动在启动、配置、脚本执行失败时返回的错误。

use thiserror::Error;

use crate::config::ConfigError;
use crate::scripting::ScriptException;

/// 原生错误类别
///
/// 每个类别在异常类表中对应一个脚本异常类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 引擎运行时错误 (RGSSError)
    Rgss,
    /// 文件不存在 (Errno::ENOENT)
    NoFile,
    /// I/O 错误 (IOError)
    Io,
    /// 类型错误 (TypeError)
    Type,
    /// 参数错误 (ArgumentError)
    Argument,
    /// 文件系统库错误 (PHYSFSError)
    Physfs,
    /// 平台库错误 (SDLError)
    Sdl,
    /// 引擎内部错误 (MKXPError)
    Mkxp,
    /// 绑定注册缺陷，不可恢复 (fatal)
    Fatal,
}

/// 原生错误
///
/// 消息文本会原样传递给脚本异常。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NativeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl NativeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rgss(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rgss, message)
    }

    pub fn no_file(path: &str) -> Self {
        Self::new(
            ErrorKind::NoFile,
            format!("No such file or directory - {}", path),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, message)
    }

    pub fn physfs(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Physfs, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }
}

impl From<std::io::Error> for NativeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::new(ErrorKind::NoFile, err.to_string()),
            _ => Self::io(err.to_string()),
        }
    }
}

/// 引擎驱动错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptException),

    #[error("Native error: {0}")]
    Native(#[from] NativeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 原生结果类型别名
pub type NativeResult<T> = Result<T, NativeError>;
/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
