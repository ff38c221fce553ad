//! Helpers shared by the binding modules.
//!
//! The attribute macros generate a getter/setter trampoline pair for a field of a wrapped
//! native type. Both halves decode their arguments through `get_args`, so arity and type
//! errors surface exactly like hand-written bindings.

use crate::core::SharedState;
use crate::scripting::{ScriptRuntime, Value, VmResult};

/// Integer attribute on a wrapped type, with an optional clamp applied on write.
macro_rules! int_attr {
    ($ty:ty, $field:ident, $getter:ident, $setter:ident $(, $clamp:expr)?) => {
        fn $getter(
            vm: &mut $crate::scripting::ScriptRuntime,
            this: &$crate::scripting::Value,
            args: &[$crate::scripting::Value],
        ) -> $crate::scripting::VmResult<$crate::scripting::Value> {
            vm.get_args(args, "", &mut [])?;
            let data = vm.get_private_data::<$ty>(this)?;
            Ok($crate::scripting::Value::Int(i64::from(data.$field)))
        }

        fn $setter(
            vm: &mut $crate::scripting::ScriptRuntime,
            this: &$crate::scripting::Value,
            args: &[$crate::scripting::Value],
        ) -> $crate::scripting::VmResult<$crate::scripting::Value> {
            let mut value = 0;
            vm.get_args(args, "i", &mut [$crate::bindings::args::Arg::Int(&mut value)])?;
            $(let value = ($clamp)(value);)?
            vm.get_private_data::<$ty>(this)?.$field = value;
            Ok($crate::scripting::Value::Int(i64::from(value)))
        }
    };
}

/// Boolean attribute on a wrapped type.
macro_rules! bool_attr {
    ($ty:ty, $field:ident, $getter:ident, $setter:ident) => {
        fn $getter(
            vm: &mut $crate::scripting::ScriptRuntime,
            this: &$crate::scripting::Value,
            args: &[$crate::scripting::Value],
        ) -> $crate::scripting::VmResult<$crate::scripting::Value> {
            vm.get_args(args, "", &mut [])?;
            let data = vm.get_private_data::<$ty>(this)?;
            Ok($crate::scripting::Value::Bool(data.$field))
        }

        fn $setter(
            vm: &mut $crate::scripting::ScriptRuntime,
            this: &$crate::scripting::Value,
            args: &[$crate::scripting::Value],
        ) -> $crate::scripting::VmResult<$crate::scripting::Value> {
            let mut value = false;
            vm.get_args(args, "b", &mut [$crate::bindings::args::Arg::Bool(&mut value)])?;
            vm.get_private_data::<$ty>(this)?.$field = value;
            Ok($crate::scripting::Value::Bool(value))
        }
    };
}

/// Rejects any argument.
pub fn no_args(vm: &ScriptRuntime, args: &[Value]) -> VmResult<()> {
    vm.get_args(args, "", &mut [])?;
    Ok(())
}

/// Reads from the shared state, or returns `default` when none is attached.
pub fn with_shared<T>(vm: &ScriptRuntime, default: T, read: impl FnOnce(&SharedState) -> T) -> T {
    vm.shared().map_or(default, read)
}

/// Mutates the shared state when one is attached.
pub fn with_shared_mut(vm: &mut ScriptRuntime, write: impl FnOnce(&mut SharedState)) {
    if let Some(shared) = vm.shared_mut() {
        write(shared);
    }
}

pub fn dispose(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    vm.dispose(this)?;
    Ok(Value::Nil)
}

pub fn is_disposed(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Bool(vm.is_disposed(this)?))
}

/// Accepts a String or an Array of Strings, as `Font#name=` does.
pub fn string_list(vm: &ScriptRuntime, value: &Value) -> VmResult<Vec<String>> {
    match value {
        Value::Str(name) => Ok(vec![name.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Str(name) => Ok(name.clone()),
                other => Err(vm.raise(
                    vm.core().type_error,
                    format!(
                        "no implicit conversion of {} into String",
                        vm.class_name_of(other)
                    ),
                )),
            })
            .collect(),
        other => Err(vm.raise(
            vm.core().type_error,
            format!(
                "no implicit conversion of {} into String",
                vm.class_name_of(other)
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list() {
        let vm = ScriptRuntime::new();
        assert_eq!(string_list(&vm, &Value::from("Arial")).unwrap(), vec!["Arial"]);

        let names = Value::Array(vec![Value::from("VL Gothic"), Value::from("Arial")]);
        assert_eq!(string_list(&vm, &names).unwrap(), vec!["VL Gothic", "Arial"]);

        let err = string_list(&vm, &Value::Int(3)).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "TypeError");
    }

    #[test]
    fn test_defaults_without_shared_state() {
        let mut vm = ScriptRuntime::new();
        assert_eq!(with_shared(&vm, 640, |s| s.graphics.width()), 640);
        with_shared_mut(&mut vm, |s| s.graphics.set_brightness(0));
        assert!(no_args(&vm, &[Value::Nil]).is_err());
    }
}
