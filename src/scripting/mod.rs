//! 脚本运行时模型
//!
//! - `value` / `symbol` - 脚本值和符号
//! - `class` - 类表与原生方法
//! - `object` - 对象堆、类型化原生数据和释放跟踪
//! - `exception` - 脚本异常、展开信号和原生错误重映射
//! - `runtime` - 运行时上下文、方法分派和垃圾回收
//! - `program` - 按顺序执行的脚本段

pub mod class;
pub mod exception;
pub mod object;
pub mod program;
pub mod runtime;
pub mod symbol;
pub mod value;

pub use class::{ClassKind, NativeFn};
pub use exception::{ExceptionKind, ExceptionTable, ScriptException, Unwind, VmResult};
pub use object::{BoundData, BoundType, DataState, NativeData, Projection};
pub use program::{ScriptProgram, ScriptSection};
pub use runtime::{Block, CoreClasses, ScriptRuntime};
pub use symbol::SymbolTable;
pub use value::{ClassId, ObjectId, SymbolId, Value};
