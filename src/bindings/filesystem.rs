//! `File` class bindings over the game filesystem.
//!
//! Handles keep a path, an access mode and a cursor; every read and write goes through
//! [`Filesystem`] so paths stay rooted in the game directory.

use super::args::Arg;
use super::util::no_args;
use crate::core::error::{ErrorKind, NativeError};
use crate::filesystem::Filesystem;
use crate::impl_bound_data;
use crate::scripting::{ExceptionKind, ScriptRuntime, Value, VmResult};

/// Largest file `File#read` loads in one call.
const MAX_READ: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

impl FileMode {
    fn parse(mode: &str) -> Option<Self> {
        match mode.trim_end_matches('b') {
            "r" => Some(FileMode::Read),
            "w" => Some(FileMode::Write),
            "a" => Some(FileMode::Append),
            _ => None,
        }
    }

    fn writable(self) -> bool {
        self != FileMode::Read
    }
}

#[derive(Debug, Clone)]
pub struct FileHandle {
    pub path: String,
    pub mode: FileMode,
    pub pos: u64,
    pub closed: bool,
}

impl_bound_data!(FileHandle, FILE_TYPE, "File");

fn filesystem(vm: &ScriptRuntime) -> VmResult<Filesystem> {
    match vm.shared() {
        Some(shared) => Ok(shared.filesystem.clone()),
        None => Err(vm.raise_native(NativeError::new(
            ErrorKind::Mkxp,
            "filesystem is not available",
        ))),
    }
}

/// Snapshot of an open handle; closed handles raise IOError.
fn open_handle(vm: &mut ScriptRuntime, this: &Value) -> VmResult<FileHandle> {
    let handle = vm.get_private_data::<FileHandle>(this)?.clone();
    if handle.closed {
        return Err(vm.raise_kind(ExceptionKind::IoError, "closed stream"));
    }
    Ok(handle)
}

fn initialize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut path = "";
    let mut mode = "r";
    vm.get_args(args, "z|z", &mut [Arg::Str(&mut path), Arg::Str(&mut mode)])?;
    let Some(file_mode) = FileMode::parse(mode) else {
        return Err(vm.raise_native(NativeError::argument(format!("invalid access mode {}", mode))));
    };

    let fs = filesystem(vm)?;
    let pos = match file_mode {
        FileMode::Read => vm.guard(fs.file_size(path)).map(|_| 0)?,
        FileMode::Write => vm.guard(fs.write_file(path, &[])).map(|_| 0)?,
        FileMode::Append => {
            if fs.is_file(path) {
                vm.guard(fs.file_size(path))?
            } else {
                vm.guard(fs.write_file(path, &[]))?;
                0
            }
        }
    };
    tracing::debug!(target: "bindings", path, mode, "file opened");
    vm.set_private_data(
        this,
        FileHandle {
            path: path.to_string(),
            mode: file_mode,
            pos,
            closed: false,
        },
    )?;
    Ok(Value::Nil)
}

fn close(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    vm.get_private_data::<FileHandle>(this)?.closed = true;
    Ok(Value::Nil)
}

fn is_closed(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Bool(vm.get_private_data::<FileHandle>(this)?.closed))
}

fn read(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut length = -1;
    vm.get_args(args, "|i", &mut [Arg::Int(&mut length)])?;
    let handle = open_handle(vm, this)?;
    let fs = filesystem(vm)?;

    let limit = usize::try_from(length).ok();
    let size = vm.guard(fs.file_size(&handle.path))?;
    if size > MAX_READ as u64 && limit.is_none() {
        return Err(vm.raise_native(NativeError::io(format!("{} is too large to read", handle.path))));
    }
    let bytes = vm.guard(fs.read_at(&handle.path, handle.pos, limit))?;
    if bytes.is_empty() && limit.is_some_and(|n| n > 0) {
        return Ok(Value::Nil);
    }
    vm.get_private_data::<FileHandle>(this)?.pos = handle.pos + bytes.len() as u64;
    Ok(Value::from(bytes))
}

fn write(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut data: &[u8] = &[];
    vm.get_args(args, "s", &mut [Arg::Bytes(&mut data)])?;
    let handle = open_handle(vm, this)?;
    if !handle.mode.writable() {
        return Err(vm.raise_kind(ExceptionKind::IoError, "not opened for writing"));
    }
    let fs = filesystem(vm)?;
    vm.guard(fs.write_at(&handle.path, handle.pos, data, false))?;
    vm.get_private_data::<FileHandle>(this)?.pos = handle.pos + data.len() as u64;
    Ok(Value::Int(data.len() as i64))
}

fn pos(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let handle = open_handle(vm, this)?;
    Ok(Value::Int(handle.pos as i64))
}

fn set_pos(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut offset = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut offset)])?;
    open_handle(vm, this)?;
    let Ok(pos) = u64::try_from(offset) else {
        return Err(vm.raise_native(NativeError::argument(format!("negative position {}", offset))));
    };
    vm.get_private_data::<FileHandle>(this)?.pos = pos;
    Ok(Value::Int(i64::from(offset)))
}

fn size(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let handle = open_handle(vm, this)?;
    let fs = filesystem(vm)?;
    let size = vm.guard(fs.file_size(&handle.path))?;
    Ok(Value::Int(size as i64))
}

fn exist(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut path = "";
    vm.get_args(args, "z", &mut [Arg::Str(&mut path)])?;
    let found = vm
        .shared()
        .map(|shared| shared.filesystem.exists(path))
        .unwrap_or(false);
    Ok(Value::Bool(found))
}

pub fn register(vm: &mut ScriptRuntime) {
    let object = vm.core().object;
    let class = vm.define_class("File", object);
    vm.define_alloc_func(class, &FILE_TYPE);

    vm.define_method(class, "initialize", initialize);
    vm.define_method(class, "close", close);
    vm.define_method(class, "closed?", is_closed);
    vm.define_method(class, "read", read);
    vm.define_method(class, "write", write);
    vm.define_method(class, "pos", pos);
    vm.define_method(class, "pos=", set_pos);
    vm.define_method(class, "size", size);

    vm.define_singleton_method(class, "exist?", exist);
}
