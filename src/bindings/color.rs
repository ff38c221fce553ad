//! `Color` class bindings.

use super::args::Arg;
use super::util::no_args;
use crate::core::error::NativeError;
use crate::domain::Color;
use crate::impl_bound_data;
use crate::scripting::{ClassId, ScriptRuntime, Value, VmResult};

impl_bound_data!(Color, COLOR_TYPE, "Color");

/// The registered `Color` class.
pub(crate) fn color_class(vm: &ScriptRuntime) -> VmResult<ClassId> {
    match vm.const_lookup("Color")? {
        Value::Class(class) => Ok(class),
        other => Err(vm.raise(
            vm.core().type_error,
            format!("{} is not a class", vm.inspect(&other)),
        )),
    }
}

/// Wraps a fresh, independently owned color.
pub(crate) fn wrap_color(vm: &mut ScriptRuntime, color: Color) -> VmResult<Value> {
    let class = color_class(vm)?;
    Ok(vm.wrap_object(color, class))
}

fn initialize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let (mut red, mut green, mut blue, mut alpha) = (0.0, 0.0, 0.0, 255.0);
    let given = vm.get_args(
        args,
        "|ffff",
        &mut [
            Arg::Float(&mut red),
            Arg::Float(&mut green),
            Arg::Float(&mut blue),
            Arg::Float(&mut alpha),
        ],
    )?;
    let color = match given {
        0 => Color::transparent(),
        3 | 4 => Color::new(red, green, blue, alpha),
        n => {
            return Err(vm.raise_native(NativeError::argument(format!(
                "wrong number of arguments (given {}, expected 0, 3..4)",
                n
            ))))
        }
    };
    vm.set_private_data(this, color)?;
    Ok(Value::Nil)
}

fn initialize_copy(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut original = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut original)])?;
    let color = *vm.get_private_data::<Color>(&original)?;
    vm.set_private_data(this, color)?;
    Ok(this.clone())
}

fn set(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let (mut red, mut green, mut blue, mut alpha) = (0.0, 0.0, 0.0, 255.0);
    vm.get_args(
        args,
        "fff|f",
        &mut [
            Arg::Float(&mut red),
            Arg::Float(&mut green),
            Arg::Float(&mut blue),
            Arg::Float(&mut alpha),
        ],
    )?;
    vm.get_private_data::<Color>(this)?.set(red, green, blue, alpha);
    Ok(this.clone())
}

macro_rules! channel {
    ($getter:ident, $setter:ident, $read:ident, $write:ident) => {
        fn $getter(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
            no_args(vm, args)?;
            Ok(Value::Float(vm.get_private_data::<Color>(this)?.$read()))
        }

        fn $setter(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
            let mut value = 0.0;
            vm.get_args(args, "f", &mut [Arg::Float(&mut value)])?;
            let color = vm.get_private_data::<Color>(this)?;
            color.$write(value);
            Ok(Value::Float(color.$read()))
        }
    };
}

channel!(red, set_red, red, set_red);
channel!(green, set_green, green, set_green);
channel!(blue, set_blue, blue, set_blue);
channel!(alpha, set_alpha, alpha, set_alpha);

fn to_s(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Str(vm.get_private_data::<Color>(this)?.to_string()))
}

fn equals(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut other = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut other)])?;
    let class = color_class(vm)?;
    if !vm.is_kind_of(&other, class) {
        return Ok(Value::Bool(false));
    }
    let theirs = *vm.get_private_data::<Color>(&other)?;
    Ok(Value::Bool(*vm.get_private_data::<Color>(this)? == theirs))
}

pub fn register(vm: &mut ScriptRuntime) {
    let object = vm.core().object;
    let class = vm.define_class("Color", object);
    vm.define_alloc_func(class, &COLOR_TYPE);

    vm.define_method(class, "initialize", initialize);
    vm.define_method(class, "initialize_copy", initialize_copy);
    vm.define_method(class, "set", set);
    vm.define_method(class, "red", red);
    vm.define_method(class, "red=", set_red);
    vm.define_method(class, "green", green);
    vm.define_method(class, "green=", set_green);
    vm.define_method(class, "blue", blue);
    vm.define_method(class, "blue=", set_blue);
    vm.define_method(class, "alpha", alpha);
    vm.define_method(class, "alpha=", set_alpha);
    vm.define_method(class, "to_s", to_s);
    vm.define_method(class, "inspect", to_s);
    vm.define_method(class, "==", equals);
}
