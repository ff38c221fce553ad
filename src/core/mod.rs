//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `engine` - 顶层驱动和脚本执行循环
//! - `shared_state` - 子系统共享状态
//! - `error` - 错误类型定义

pub mod engine;
pub mod error;
pub mod shared_state;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{EngineError, EngineResult, ErrorKind, NativeError, NativeResult};

// 重新导出主要类型
pub use engine::{Engine, ExitReason};
pub use shared_state::{FrameSignal, SharedState};
