//! Input module bindings.

use super::args::Arg;
use super::util::{no_args, with_shared, with_shared_mut};
use crate::input::Button;
use crate::scripting::{ScriptRuntime, Value, VmResult};

/// Button argument: an Integer code, or a Symbol naming a button.
fn button_code(vm: &mut ScriptRuntime, args: &[Value]) -> VmResult<Option<i32>> {
    let mut button = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut button)])?;
    match button {
        Value::Int(code) => Ok(i32::try_from(code).ok()),
        Value::Symbol(sym) => Ok(Button::from_name(vm.symbol_name(sym)).map(Button::code)),
        other => Err(vm.raise(
            vm.core().type_error,
            format!("wrong argument type {} (expected Integer or Symbol)", vm.class_name_of(&other)),
        )),
    }
}

fn query(vm: &mut ScriptRuntime, args: &[Value], test: fn(&crate::input::Input, i32) -> bool) -> VmResult<Value> {
    let pressed = match button_code(vm, args)? {
        Some(code) => with_shared(vm, false, |s| test(&s.input, code)),
        None => false,
    };
    Ok(Value::Bool(pressed))
}

fn update(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    with_shared_mut(vm, |s| s.update_input());
    Ok(Value::Nil)
}

fn press(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    query(vm, args, |input, code| input.is_pressed(code))
}

fn trigger(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    query(vm, args, |input, code| input.is_triggered(code))
}

fn repeat(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    query(vm, args, |input, code| input.is_repeating(code))
}

fn dir4(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(with_shared(vm, 0, |s| s.input.dir4()))))
}

fn dir8(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(with_shared(vm, 0, |s| s.input.dir8()))))
}

pub fn register(vm: &mut ScriptRuntime) {
    let module = vm.define_module("Input");

    vm.define_singleton_method(module, "update", update);
    vm.define_singleton_method(module, "press?", press);
    vm.define_singleton_method(module, "trigger?", trigger);
    vm.define_singleton_method(module, "repeat?", repeat);
    vm.define_singleton_method(module, "dir4", dir4);
    vm.define_singleton_method(module, "dir8", dir8);

    // RGSS3 的按钮常量是符号，之前的版本是整数
    let symbols = vm.rgss_version() >= 3;
    for button in Button::ALL {
        let value = if symbols {
            vm.symbol(button.name())
        } else {
            Value::Int(i64::from(button.code()))
        };
        vm.const_set(module, button.name(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::test_support::{engine_vm, module};
    use crate::platform::HostEvent;

    const KEY_Z: u8 = 90;

    #[test]
    fn test_constants_follow_version() {
        let mut vm = ScriptRuntime::new();
        register(&mut vm);
        let down = vm.const_lookup("Input::DOWN").unwrap();
        assert_eq!(vm.inspect(&down), ":DOWN");

        let mut vm = ScriptRuntime::new();
        vm.set_rgss_version(2);
        register(&mut vm);
        assert_eq!(vm.const_lookup("Input::C").unwrap(), Value::Int(13));
    }

    #[test]
    fn test_trigger_then_press() {
        let (_dir, mut vm, host) = engine_vm();
        let input = module(&vm, "Input");
        let graphics = module(&vm, "Graphics");
        let c = vm.const_lookup("Input::C").unwrap();

        host.send_event(HostEvent::Key {
            code: KEY_Z,
            pressed: true,
        });
        vm.call(&graphics, "update", &[]).unwrap();
        vm.call(&input, "update", &[]).unwrap();
        assert_eq!(vm.call(&input, "trigger?", &[c.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(vm.call(&input, "press?", &[Value::Int(13)]).unwrap(), Value::Bool(true));

        vm.call(&input, "update", &[]).unwrap();
        assert_eq!(vm.call(&input, "trigger?", &[c.clone()]).unwrap(), Value::Bool(false));
        assert_eq!(vm.call(&input, "press?", &[c]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_unknown_buttons_and_bad_types() {
        let (_dir, mut vm, _host) = engine_vm();
        let input = module(&vm, "Input");
        let nope = vm.symbol("NOPE");
        assert_eq!(vm.call(&input, "press?", &[nope]).unwrap(), Value::Bool(false));

        let err = vm.call(&input, "press?", &[Value::from("C")]).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "TypeError");
        let err = vm.call(&input, "press?", &[]).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "ArgumentError");
    }

    #[test]
    fn test_dir8_diagonal() {
        let (_dir, mut vm, host) = engine_vm();
        let input = module(&vm, "Input");
        host.send_event(HostEvent::Key { code: 38, pressed: true });
        host.send_event(HostEvent::Key { code: 39, pressed: true });
        vm.call(&input, "update", &[]).unwrap();
        assert_eq!(vm.call(&input, "dir8", &[]).unwrap(), Value::Int(9));
        assert_eq!(vm.call(&input, "dir4", &[]).unwrap(), Value::Int(0));
    }
}
