//! Kernel functions, globals and the `MKXP` / `RPG` modules.

use super::args::Arg;
use super::graphics;
use super::util::{no_args, with_shared, with_shared_mut};
use crate::config::ScriptConfig;
use crate::core::error::NativeError;
use crate::input::KEY_COUNT;
use crate::platform::BridgeCommand;
use crate::scripting::{ScriptRuntime, Unwind, Value, VmResult};

/// Version string exposed to RGSS3 scripts.
pub const RGSS_VERSION: &str = "3.0.1";

/// Runs the main block, rerunning it after every reset.
fn rgss_main(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let Some(block) = vm.current_block() else {
        return Err(vm.raise_native(NativeError::argument("no block given")));
    };
    loop {
        match block(vm) {
            Err(Unwind::Reset) => {
                tracing::info!(target: "script", "reset inside rgss_main, restarting block");
                with_shared_mut(vm, |s| s.process_reset());
            }
            other => return other.map(|_| Value::Nil),
        }
    }
}

/// Keeps rendering frames until a reset or terminate unwinds out.
fn rgss_stop(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    if vm.shared().is_none() {
        return Ok(Value::Nil);
    }
    loop {
        graphics::update_frame(vm)?;
    }
}

fn show(vm: &ScriptRuntime, text: String) {
    tracing::info!(target: "script", %text, "message box");
    if let Some(shared) = vm.shared() {
        shared.message_box(text);
    }
}

fn msgbox(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let text: String = args.iter().map(|arg| vm.to_s(arg)).collect();
    show(vm, text);
    Ok(Value::Nil)
}

fn msgbox_p(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let lines: Vec<String> = args.iter().map(|arg| vm.inspect(arg)).collect();
    show(vm, lines.join("\n"));
    Ok(match args {
        [] => Value::Nil,
        [single] => single.clone(),
        many => Value::Array(many.to_vec()),
    })
}

// ---- MKXP ----

fn data_directory(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let dir = with_shared(vm, String::new(), |s| {
        s.filesystem.root().display().to_string()
    });
    Ok(Value::Str(dir))
}

fn puts(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut text = "";
    vm.get_args(args, "z", &mut [Arg::Str(&mut text)])?;
    tracing::debug!(target: "script", text, "console output");
    if let Some(shared) = vm.shared() {
        shared.bridge.send(BridgeCommand::Console {
            text: text.to_string(),
        });
    }
    Ok(Value::Nil)
}

fn raw_key_states(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let states = with_shared(vm, vec![false; KEY_COUNT], |s| s.input.raw_key_states());
    Ok(Value::Array(states.into_iter().map(Value::Bool).collect()))
}

fn mouse_in_window(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Bool(true))
}

pub fn register(vm: &mut ScriptRuntime, config: &ScriptConfig) {
    let kernel = vm.core().kernel;
    let version = vm.rgss_version();

    vm.define_singleton_method(kernel, "rgss_main", rgss_main);
    vm.define_singleton_method(kernel, "rgss_stop", rgss_stop);
    if version >= 3 {
        vm.define_singleton_method(kernel, "msgbox", msgbox);
        vm.define_singleton_method(kernel, "msgbox_p", msgbox_p);
    } else {
        vm.define_singleton_method(kernel, "print", msgbox);
        vm.define_singleton_method(kernel, "p", msgbox_p);
    }

    // 全局变量；RGSS3 用 $TEST 代替 $DEBUG
    vm.gv_set("$MKXP", Value::Bool(true));
    if version >= 3 {
        vm.gv_set("$TEST", Value::Bool(config.test_mode));
        vm.gv_set("$BTEST", Value::Bool(config.battle_test));
        let object = vm.core().object;
        vm.const_set(object, "RGSS_VERSION", Value::from(RGSS_VERSION));
    } else {
        vm.gv_set("$DEBUG", Value::Bool(config.test_mode));
    }

    let mkxp = vm.define_module("MKXP");
    vm.define_singleton_method(mkxp, "data_directory", data_directory);
    vm.define_singleton_method(mkxp, "puts", puts);
    vm.define_singleton_method(mkxp, "raw_key_states", raw_key_states);
    vm.define_singleton_method(mkxp, "mouse_in_window", mouse_in_window);

    vm.define_module("RPG");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::test_support::{engine_vm, module};
    use crate::platform::HostEvent;
    use crate::scripting::Block;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup(version: u8) -> ScriptRuntime {
        let mut vm = ScriptRuntime::new();
        vm.set_rgss_version(version);
        vm.init_exception_table(version);
        let config = ScriptConfig {
            test_mode: true,
            ..ScriptConfig::default()
        };
        register(&mut vm, &config);
        vm
    }

    #[test]
    fn test_globals_and_constants() {
        let vm = setup(3);
        assert_eq!(vm.gv_get("$TEST"), Value::Bool(true));
        assert_eq!(vm.gv_get("$BTEST"), Value::Bool(false));
        assert_eq!(vm.gv_get("$MKXP"), Value::Bool(true));
        assert_eq!(vm.const_lookup("RGSS_VERSION").unwrap(), Value::from("3.0.1"));
        assert!(vm.const_lookup("RPG").is_ok());

        let vm = setup(1);
        assert!(vm.const_lookup("RGSS_VERSION").is_err());
        assert_eq!(vm.gv_get("$DEBUG"), Value::Bool(true));
        assert_eq!(vm.gv_get("$TEST"), Value::Nil);
    }

    #[test]
    fn test_message_box_names_follow_version() {
        let mut vm = setup(3);
        assert!(vm.call_function("msgbox", &[Value::from("hi")]).is_ok());
        assert!(vm.call_function("print", &[]).is_err());

        let mut vm = setup(2);
        assert!(vm.call_function("print", &[Value::Int(1)]).is_ok());
        assert_eq!(vm.call_function("p", &[Value::Int(7)]).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_msgbox_reaches_host() {
        let (_dir, mut vm, host) = engine_vm();
        vm.call_function("msgbox", &[Value::from("HP: "), Value::Int(12)]).unwrap();
        vm.call_function("msgbox_p", &[Value::from("a"), Value::Nil]).unwrap();

        let commands = host.poll_commands();
        assert!(commands.contains(&BridgeCommand::MessageBox {
            text: "HP: 12".to_string()
        }));
        assert!(commands.contains(&BridgeCommand::MessageBox {
            text: "\"a\"\nnil".to_string()
        }));
    }

    #[test]
    fn test_rgss_main_reruns_after_reset() {
        let mut vm = setup(3);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let block: Block = Rc::new(move |vm: &mut ScriptRuntime| {
            counter.set(counter.get() + 1);
            if counter.get() < 3 {
                let reset = vm.const_lookup("RGSSReset")?;
                let Value::Class(class) = reset else {
                    return Ok(Value::Nil);
                };
                return Err(vm.raise(class, "reset"));
            }
            Ok(Value::Nil)
        });
        vm.call_function_with_block("rgss_main", &[], Some(block)).unwrap();
        assert_eq!(runs.get(), 3);

        let err = vm.call_function("rgss_main", &[]).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "ArgumentError");
    }

    #[test]
    fn test_rgss_stop_ends_on_terminate() {
        let (_dir, mut vm, host) = engine_vm();
        host.send_event(HostEvent::TerminateRequested);
        let err = vm.call_function("rgss_stop", &[]).unwrap_err();
        assert!(err.is_terminate());
    }

    #[test]
    fn test_mkxp_module() {
        let (dir, mut vm, _host) = engine_vm();
        let mkxp = module(&vm, "MKXP");
        let states = vm.call(&mkxp, "raw_key_states", &[]).unwrap();
        assert_eq!(states.as_array().map(|s| s.len()), Some(KEY_COUNT));
        assert_eq!(vm.call(&mkxp, "mouse_in_window", &[]).unwrap(), Value::Bool(true));
        assert_eq!(
            vm.call(&mkxp, "data_directory", &[]).unwrap(),
            Value::Str(dir.path().display().to_string())
        );
        assert!(vm.call(&mkxp, "puts", &[Value::from("loaded")]).is_ok());
    }
}
