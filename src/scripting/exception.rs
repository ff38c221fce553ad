//! Script exceptions, stack unwinding and the native error remapper.

use thiserror::Error;

use super::object::BoundType;
use super::runtime::ScriptRuntime;
use super::value::ClassId;
use crate::core::error::{ErrorKind, NativeError, NativeResult};

/// A raised script exception.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} ({class_name})")]
pub struct ScriptException {
    pub class: ClassId,
    pub class_name: String,
    pub message: String,
    /// Innermost frame first.
    pub backtrace: Vec<String>,
}

/// Non-local exit travelling up the native and script stacks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Unwind {
    /// An ordinary exception, catchable with `rescue`.
    #[error(transparent)]
    Raise(ScriptException),
    /// Game reset request; unwinds to `rgss_main` or the driver.
    #[error("reset requested")]
    Reset,
    /// Shutdown request; unwinds to the driver.
    #[error("terminate requested")]
    Terminate,
}

impl Unwind {
    pub fn exception(&self) -> Option<&ScriptException> {
        match self {
            Unwind::Raise(exc) => Some(exc),
            _ => None,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, Unwind::Reset)
    }

    pub fn is_terminate(&self) -> bool {
        matches!(self, Unwind::Terminate)
    }
}

impl From<ScriptException> for Unwind {
    fn from(exc: ScriptException) -> Self {
        Unwind::Raise(exc)
    }
}

pub type VmResult<T> = Result<T, Unwind>;

/// Engine exception categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    RgssError,
    NoFile,
    IoError,
    TypeError,
    ArgumentError,
    PhysfsError,
    SdlError,
    MkxpError,
    Reset,
    Terminate,
    Fatal,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 11] = [
        ExceptionKind::RgssError,
        ExceptionKind::NoFile,
        ExceptionKind::IoError,
        ExceptionKind::TypeError,
        ExceptionKind::ArgumentError,
        ExceptionKind::PhysfsError,
        ExceptionKind::SdlError,
        ExceptionKind::MkxpError,
        ExceptionKind::Reset,
        ExceptionKind::Terminate,
        ExceptionKind::Fatal,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl From<ErrorKind> for ExceptionKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Rgss => ExceptionKind::RgssError,
            ErrorKind::NoFile => ExceptionKind::NoFile,
            ErrorKind::Io => ExceptionKind::IoError,
            ErrorKind::Type => ExceptionKind::TypeError,
            ErrorKind::Argument => ExceptionKind::ArgumentError,
            ErrorKind::Physfs => ExceptionKind::PhysfsError,
            ErrorKind::Sdl => ExceptionKind::SdlError,
            ErrorKind::Mkxp => ExceptionKind::MkxpError,
            ErrorKind::Fatal => ExceptionKind::Fatal,
        }
    }
}

/// Class handles for every [`ExceptionKind`], built once per runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionTable {
    classes: [ClassId; 11],
}

impl ExceptionTable {
    pub fn class_for(&self, kind: ExceptionKind) -> ClassId {
        self.classes[kind.index()]
    }

    pub fn kind_of(&self, class: ClassId) -> Option<ExceptionKind> {
        ExceptionKind::ALL
            .into_iter()
            .find(|kind| self.classes[kind.index()] == class)
    }
}

impl ScriptRuntime {
    /// Defines the engine exception classes and installs the table.
    ///
    /// Calling it again returns the existing table.
    pub fn init_exception_table(&mut self, rgss_version: u8) -> ExceptionTable {
        if let Some(table) = self.exceptions {
            return table;
        }
        let core = self.core;
        let reset_name = if rgss_version >= 3 { "RGSSReset" } else { "Reset" };
        let exception = core.exception;
        let classes = [
            self.define_class("RGSSError", core.standard_error),
            core.enoent,
            core.io_error,
            core.type_error,
            core.argument_error,
            self.define_class("PHYSFSError", exception),
            self.define_class("SDLError", exception),
            self.define_class("MKXPError", exception),
            self.define_class(reset_name, exception),
            core.system_exit,
            core.fatal,
        ];
        tracing::debug!(target: "bindings", reset = reset_name, "exception table initialized");
        let table = ExceptionTable { classes };
        self.exceptions = Some(table);
        table
    }

    pub fn exception_table(&self) -> Option<&ExceptionTable> {
        self.exceptions.as_ref()
    }

    pub fn clear_exception_table(&mut self) {
        self.exceptions = None;
    }

    /// Class registered for `kind`, falling back to `RuntimeError` without a table.
    pub fn exception_class(&self, kind: ExceptionKind) -> ClassId {
        match &self.exceptions {
            Some(table) => table.class_for(kind),
            None => self.core.runtime_error,
        }
    }

    pub fn raise_kind(&self, kind: ExceptionKind, message: impl Into<String>) -> Unwind {
        self.raise(self.exception_class(kind), message)
    }

    /// Remaps a native failure into the script exception registered for its kind.
    pub fn raise_native(&self, err: NativeError) -> Unwind {
        tracing::debug!(target: "bindings", kind = ?err.kind, message = %err.message, "native error");
        self.raise_kind(err.kind.into(), err.message)
    }

    /// `RGSSError` reading `disposed <type>`.
    pub fn raise_disposed_access(&self, ty: &BoundType) -> Unwind {
        self.raise_kind(ExceptionKind::RgssError, format!("disposed {}", ty.label()))
    }

    /// Converts a native result at a binding boundary.
    pub fn guard<T>(&self, result: NativeResult<T>) -> VmResult<T> {
        result.map_err(|err| self.raise_native(err))
    }
}
