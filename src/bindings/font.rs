//! `Font` class bindings.
//!
//! A font owns its colors. `Font#color` hands out a handle aliasing the font's own color, so
//! `font.color.red = 0` edits the font, and disposing the font invalidates the handle.

use super::args::Arg;
use super::color::{color_class, wrap_color};
use super::util::{dispose, is_disposed, no_args, string_list, with_shared, with_shared_mut};
use crate::core::error::NativeError;
use crate::domain::{Color, Font, FontDefaults};
use crate::impl_bound_data;
use crate::scripting::{NativeData, ScriptRuntime, Value, VmResult};

impl_bound_data!(Font, FONT_TYPE, "Font");

/// Largest size a font accepts.
const MAX_FONT_SIZE: i32 = 96;

fn font_color(data: &mut NativeData) -> Option<&mut NativeData> {
    data.downcast_mut::<Font>()
        .map(|font| &mut font.color as &mut NativeData)
}

fn font_out_color(data: &mut NativeData) -> Option<&mut NativeData> {
    data.downcast_mut::<Font>()
        .map(|font| &mut font.out_color as &mut NativeData)
}

fn defaults(vm: &ScriptRuntime) -> FontDefaults {
    with_shared(vm, FontDefaults::default(), |s| s.font_defaults.clone())
}

fn check_size(vm: &ScriptRuntime, size: i32) -> VmResult<i32> {
    if size > MAX_FONT_SIZE {
        return Err(vm.raise_native(NativeError::argument("font size too big")));
    }
    Ok(size)
}

/// A name list as a script value: a String for one entry, an Array otherwise.
fn names_value(names: &[String]) -> Value {
    match names {
        [single] => Value::from(single.as_str()),
        many => Value::Array(many.iter().map(|n| Value::from(n.as_str())).collect()),
    }
}

fn initialize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut name = Value::Nil;
    let mut size = 0;
    vm.get_args(args, "|oi", &mut [Arg::Object(&mut name), Arg::Int(&mut size)])?;
    let size = check_size(vm, size)?;
    let names = if name.is_nil() {
        None
    } else {
        Some(string_list(vm, &name)?)
    };

    let font = Font::new(names, Some(size), &defaults(vm));
    vm.set_private_data(this, font)?;
    vm.ivar_set(this, "name", name)?;
    Ok(Value::Nil)
}

fn initialize_copy(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut original = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut original)])?;
    let font = vm.get_private_data::<Font>(&original)?.clone();
    vm.set_private_data(this, font)?;
    // 复制出来的颜色句柄仍指向原字体
    vm.ivar_set(this, "color", Value::Nil)?;
    vm.ivar_set(this, "out_color", Value::Nil)?;
    Ok(this.clone())
}

fn name(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let names = vm.get_private_data::<Font>(this)?.name.clone();
    match vm.ivar_get(this, "name") {
        Value::Nil => Ok(names_value(&names)),
        stored => Ok(stored),
    }
}

fn set_name(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut value = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut value)])?;
    vm.get_private_data::<Font>(this)?;
    let names = string_list(vm, &value)?;
    vm.get_private_data::<Font>(this)?.name = names;
    vm.ivar_set(this, "name", value.clone())?;
    Ok(value)
}

fn size(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(vm.get_private_data::<Font>(this)?.size)))
}

fn set_size(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut value = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut value)])?;
    vm.get_private_data::<Font>(this)?;
    let value = check_size(vm, value)?;
    vm.get_private_data::<Font>(this)?.size = value;
    Ok(Value::Int(i64::from(value)))
}

bool_attr!(Font, bold, bold, set_bold);
bool_attr!(Font, italic, italic, set_italic);
bool_attr!(Font, outline, outline, set_outline);
bool_attr!(Font, shadow, shadow, set_shadow);

macro_rules! color_property {
    ($getter:ident, $setter:ident, $field:ident, $project:ident, $ivar:literal) => {
        fn $getter(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
            no_args(vm, args)?;
            vm.get_private_data::<Font>(this)?;
            let cached = vm.ivar_get(this, $ivar);
            if !cached.is_nil() {
                return Ok(cached);
            }
            let class = color_class(vm)?;
            vm.wrap_property::<Color>(this, $project, $ivar, class)
        }

        fn $setter(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
            let mut value = Value::Nil;
            vm.get_args(args, "o", &mut [Arg::Object(&mut value)])?;
            let color = *vm.get_private_data::<Color>(&value)?;
            vm.get_private_data::<Font>(this)?.$field = color;
            Ok(value)
        }
    };
}

color_property!(color, set_color, color, font_color, "color");
color_property!(out_color, set_out_color, out_color, font_out_color, "out_color");

// ---- class methods ----

fn exist(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut name = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut name)])?;
    Ok(Value::Bool(Font::exists(name.as_str())))
}

fn default_name(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    match vm.ivar_get(this, "default_name") {
        Value::Nil => Ok(names_value(&defaults(vm).name)),
        stored => Ok(stored),
    }
}

fn set_default_name(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut value = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut value)])?;
    let names = string_list(vm, &value)?;
    with_shared_mut(vm, |s| s.font_defaults.name = names);
    vm.ivar_set(this, "default_name", value.clone())?;
    Ok(value)
}

fn default_size(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(defaults(vm).size)))
}

fn set_default_size(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut value = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut value)])?;
    let value = check_size(vm, value)?;
    with_shared_mut(vm, |s| s.font_defaults.size = value);
    Ok(Value::Int(i64::from(value)))
}

macro_rules! default_flag {
    ($getter:ident, $setter:ident, $field:ident) => {
        fn $getter(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            no_args(vm, args)?;
            Ok(Value::Bool(defaults(vm).$field))
        }

        fn $setter(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            let mut value = false;
            vm.get_args(args, "b", &mut [Arg::Bool(&mut value)])?;
            with_shared_mut(vm, |s| s.font_defaults.$field = value);
            Ok(Value::Bool(value))
        }
    };
}

default_flag!(default_bold, set_default_bold, bold);
default_flag!(default_italic, set_default_italic, italic);
default_flag!(default_outline, set_default_outline, outline);
default_flag!(default_shadow, set_default_shadow, shadow);

macro_rules! default_color {
    ($getter:ident, $setter:ident, $field:ident) => {
        fn $getter(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            no_args(vm, args)?;
            let color = defaults(vm).$field;
            wrap_color(vm, color)
        }

        fn $setter(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            let mut value = Value::Nil;
            vm.get_args(args, "o", &mut [Arg::Object(&mut value)])?;
            let color = *vm.get_private_data::<Color>(&value)?;
            with_shared_mut(vm, |s| s.font_defaults.$field = color);
            Ok(value)
        }
    };
}

default_color!(default_color, set_default_color, color);
default_color!(default_out_color, set_default_out_color, out_color);

pub fn register(vm: &mut ScriptRuntime) {
    let object = vm.core().object;
    let class = vm.define_class("Font", object);
    vm.define_alloc_func(class, &FONT_TYPE);
    let version = vm.rgss_version();

    // 实例方法
    vm.define_method(class, "initialize", initialize);
    vm.define_method(class, "initialize_copy", initialize_copy);
    vm.define_method(class, "dispose", dispose);
    vm.define_method(class, "disposed?", is_disposed);
    vm.define_method(class, "name", name);
    vm.define_method(class, "name=", set_name);
    vm.define_method(class, "size", size);
    vm.define_method(class, "size=", set_size);
    vm.define_method(class, "bold", bold);
    vm.define_method(class, "bold=", set_bold);
    vm.define_method(class, "italic", italic);
    vm.define_method(class, "italic=", set_italic);
    vm.define_method(class, "color", color);
    vm.define_method(class, "color=", set_color);
    if version >= 2 {
        vm.define_method(class, "shadow", shadow);
        vm.define_method(class, "shadow=", set_shadow);
    }
    if version >= 3 {
        vm.define_method(class, "outline", outline);
        vm.define_method(class, "outline=", set_outline);
        vm.define_method(class, "out_color", out_color);
        vm.define_method(class, "out_color=", set_out_color);
    }

    // 类方法：默认值
    vm.define_singleton_method(class, "exist?", exist);
    vm.define_singleton_method(class, "default_name", default_name);
    vm.define_singleton_method(class, "default_name=", set_default_name);
    vm.define_singleton_method(class, "default_size", default_size);
    vm.define_singleton_method(class, "default_size=", set_default_size);
    vm.define_singleton_method(class, "default_bold", default_bold);
    vm.define_singleton_method(class, "default_bold=", set_default_bold);
    vm.define_singleton_method(class, "default_italic", default_italic);
    vm.define_singleton_method(class, "default_italic=", set_default_italic);
    vm.define_singleton_method(class, "default_color", default_color);
    vm.define_singleton_method(class, "default_color=", set_default_color);
    if version >= 2 {
        vm.define_singleton_method(class, "default_shadow", default_shadow);
        vm.define_singleton_method(class, "default_shadow=", set_default_shadow);
    }
    if version >= 3 {
        vm.define_singleton_method(class, "default_outline", default_outline);
        vm.define_singleton_method(class, "default_outline=", set_default_outline);
        vm.define_singleton_method(class, "default_out_color", default_out_color);
        vm.define_singleton_method(class, "default_out_color=", set_default_out_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::color;
    use crate::bindings::test_support::{engine_vm, module};

    fn setup() -> (ScriptRuntime, Value) {
        let mut vm = ScriptRuntime::new();
        vm.init_exception_table(3);
        color::register(&mut vm);
        register(&mut vm);
        let class = module(&vm, "Font");
        (vm, class)
    }

    #[test]
    fn test_new_uses_defaults() {
        let (mut vm, class) = setup();
        let font = vm.call(&class, "new", &[]).unwrap();
        assert_eq!(vm.call(&font, "name", &[]).unwrap(), Value::from("Arial"));
        assert_eq!(vm.call(&font, "size", &[]).unwrap(), Value::Int(24));
        assert_eq!(vm.call(&font, "outline", &[]).unwrap(), Value::Bool(true));

        let names = Value::Array(vec![Value::from("VL Gothic"), Value::from("Arial")]);
        let font = vm.call(&class, "new", &[names.clone(), Value::Int(18)]).unwrap();
        assert_eq!(vm.call(&font, "name", &[]).unwrap(), names);
        assert_eq!(vm.call(&font, "size", &[]).unwrap(), Value::Int(18));
    }

    #[test]
    fn test_disposed_font_rejects_access() {
        let (mut vm, class) = setup();
        let font = vm.call(&class, "new", &[]).unwrap();
        vm.call(&font, "dispose", &[]).unwrap();
        assert_eq!(vm.call(&font, "disposed?", &[]).unwrap(), Value::Bool(true));

        let err = vm.call(&font, "name=", &[Value::from("Times")]).unwrap_err();
        let exc = err.exception().unwrap();
        assert_eq!(exc.class_name, "RGSSError");
        assert_eq!(exc.message, "disposed font");
    }

    #[test]
    fn test_color_aliases_font() {
        let (mut vm, class) = setup();
        let font = vm.call(&class, "new", &[]).unwrap();
        let color = vm.call(&font, "color", &[]).unwrap();
        assert_eq!(vm.call(&font, "color", &[]).unwrap(), color);

        vm.call(&color, "red=", &[Value::Int(10)]).unwrap();
        let again = vm.call(&font, "color", &[]).unwrap();
        assert_eq!(vm.call(&again, "red", &[]).unwrap(), Value::Float(10.0));

        vm.call(&font, "dispose", &[]).unwrap();
        let err = vm.call(&color, "red", &[]).unwrap_err();
        assert_eq!(err.exception().unwrap().message, "disposed font");
    }

    #[test]
    fn test_dup_detaches_color() {
        let (mut vm, class) = setup();
        let font = vm.call(&class, "new", &[]).unwrap();
        let color = vm.call(&font, "color", &[]).unwrap();
        let copy = vm.call(&font, "dup", &[]).unwrap();
        let copy_color = vm.call(&copy, "color", &[]).unwrap();
        assert_ne!(copy_color, color);

        vm.call(&copy_color, "green=", &[Value::Int(0)]).unwrap();
        assert_eq!(vm.call(&color, "green", &[]).unwrap(), Value::Float(255.0));
    }

    #[test]
    fn test_size_and_name_validation() {
        let (mut vm, class) = setup();
        let font = vm.call(&class, "new", &[]).unwrap();
        let err = vm.call(&font, "size=", &[Value::Int(97)]).unwrap_err();
        assert_eq!(err.exception().unwrap().message, "font size too big");
        let err = vm.call(&font, "name=", &[Value::Int(1)]).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "TypeError");
        assert_eq!(vm.call(&class, "exist?", &[Value::from("Arial")]).unwrap(), Value::Bool(true));
        assert_eq!(vm.call(&class, "exist?", &[Value::Nil]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_defaults_live_in_shared_state() {
        let (_dir, mut vm, _host) = engine_vm();
        let class = module(&vm, "Font");
        vm.call(&class, "default_size=", &[Value::Int(30)]).unwrap();
        vm.call(&class, "default_name=", &[Value::from("VL Gothic")]).unwrap();
        vm.call(&class, "default_bold=", &[Value::Bool(true)]).unwrap();

        let font = vm.call(&class, "new", &[]).unwrap();
        assert_eq!(vm.call(&font, "size", &[]).unwrap(), Value::Int(30));
        assert_eq!(vm.call(&font, "name", &[]).unwrap(), Value::from("VL Gothic"));
        assert_eq!(vm.call(&font, "bold", &[]).unwrap(), Value::Bool(true));
        assert_eq!(vm.call(&class, "default_name", &[]).unwrap(), Value::from("VL Gothic"));

        let shade = vm.call(&class, "default_out_color", &[]).unwrap();
        vm.call(&shade, "alpha=", &[Value::Int(0)]).unwrap();
        let fresh = vm.call(&class, "default_out_color", &[]).unwrap();
        assert_eq!(vm.call(&fresh, "alpha", &[]).unwrap(), Value::Float(128.0));
    }

    #[test]
    fn test_rgss1_surface() {
        let mut vm = ScriptRuntime::new();
        vm.set_rgss_version(1);
        color::register(&mut vm);
        register(&mut vm);
        let class = module(&vm, "Font");
        let font = vm.call(&class, "new", &[]).unwrap();
        assert!(vm.call(&font, "outline", &[]).is_err());
        assert!(vm.call(&font, "shadow", &[]).is_err());
    }
}
