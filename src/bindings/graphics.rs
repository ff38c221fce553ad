//! Graphics module bindings.

use super::args::Arg;
use super::util::{no_args, with_shared, with_shared_mut};
use crate::core::FrameSignal;
use crate::graphics::{Graphics, MAX_BRIGHTNESS};
use crate::scripting::{ScriptRuntime, Unwind, Value, VmResult};

/// Advances one frame and turns host reset/terminate requests into unwinds.
pub(crate) fn update_frame(vm: &mut ScriptRuntime) -> VmResult<()> {
    let signal = match vm.shared_mut() {
        Some(shared) => shared.update_frame(),
        None => return Ok(()),
    };
    match signal {
        FrameSignal::Continue => Ok(()),
        FrameSignal::Reset => {
            tracing::debug!(target: "bindings", "reset requested during frame update");
            Err(Unwind::Reset)
        }
        FrameSignal::Terminate => Err(Unwind::Terminate),
    }
}

fn frames(vm: &mut ScriptRuntime, count: i32) -> VmResult<()> {
    for _ in 0..count.max(0) {
        update_frame(vm)?;
    }
    Ok(())
}

/// Ramps the brightness to `target` over `count` frames.
fn fade_to(vm: &mut ScriptRuntime, target: i32, count: i32) -> VmResult<()> {
    let from = with_shared(vm, MAX_BRIGHTNESS, |s| s.graphics.brightness());
    for step in 1..=count.max(0) {
        let level = Graphics::fade_level(from, target, step, count);
        with_shared_mut(vm, |s| s.graphics.set_brightness(level));
        update_frame(vm)?;
    }
    with_shared_mut(vm, |s| s.graphics.set_brightness(target));
    Ok(())
}

fn update(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    update_frame(vm)?;
    Ok(Value::Nil)
}

fn wait(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut duration = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut duration)])?;
    frames(vm, duration)?;
    Ok(Value::Nil)
}

fn fadeout(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut duration = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut duration)])?;
    fade_to(vm, 0, duration)?;
    Ok(Value::Nil)
}

fn fadein(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut duration = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut duration)])?;
    fade_to(vm, MAX_BRIGHTNESS, duration)?;
    Ok(Value::Nil)
}

fn freeze(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    with_shared_mut(vm, |s| s.graphics.freeze());
    Ok(Value::Nil)
}

fn transition(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut duration = 8;
    let mut filename = "";
    let mut vague = 40;
    vm.get_args(
        args,
        "|izi",
        &mut [
            Arg::Int(&mut duration),
            Arg::Str(&mut filename),
            Arg::Int(&mut vague),
        ],
    )?;
    let result = match vm.shared_mut() {
        Some(shared) => shared.graphics.transition(duration, filename, vague),
        None => Ok(()),
    };
    vm.guard(result)?;
    frames(vm, duration)?;
    Ok(Value::Nil)
}

fn frame_reset(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    with_shared_mut(vm, |s| s.graphics.frame_reset());
    Ok(Value::Nil)
}

fn frame_rate(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let rate = with_shared(vm, 60, |s| s.graphics.frame_rate());
    Ok(Value::Int(i64::from(rate)))
}

fn set_frame_rate(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut rate = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut rate)])?;
    with_shared_mut(vm, |s| s.graphics.set_frame_rate(rate));
    Ok(Value::Int(i64::from(rate)))
}

fn frame_count(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(with_shared(vm, 0, |s| s.graphics.frame_count())))
}

fn set_frame_count(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut count = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut count)])?;
    with_shared_mut(vm, |s| s.graphics.set_frame_count(i64::from(count)));
    Ok(Value::Int(i64::from(count)))
}

fn brightness(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    let level = with_shared(vm, MAX_BRIGHTNESS, |s| s.graphics.brightness());
    Ok(Value::Int(i64::from(level)))
}

fn set_brightness(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut level = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut level)])?;
    with_shared_mut(vm, |s| s.graphics.set_brightness(level));
    Ok(Value::Int(i64::from(level)))
}

fn width(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(with_shared(vm, 640, |s| s.graphics.width()))))
}

fn height(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(with_shared(vm, 480, |s| s.graphics.height()))))
}

fn resize_screen(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let (mut w, mut h) = (0, 0);
    vm.get_args(args, "ii", &mut [Arg::Int(&mut w), Arg::Int(&mut h)])?;
    with_shared_mut(vm, |s| s.graphics.resize_screen(w, h));
    Ok(Value::Nil)
}

fn play_movie(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut filename = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut filename)])?;
    tracing::debug!(target: "bindings", movie = %vm.to_s(&filename), "movie playback is not supported");
    Ok(Value::Nil)
}

fn snap_to_bitmap(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Nil)
}

pub fn register(vm: &mut ScriptRuntime) {
    let module = vm.define_module("Graphics");

    // 帧控制
    vm.define_singleton_method(module, "update", update);
    vm.define_singleton_method(module, "wait", wait);
    vm.define_singleton_method(module, "fadeout", fadeout);
    vm.define_singleton_method(module, "fadein", fadein);
    vm.define_singleton_method(module, "freeze", freeze);
    vm.define_singleton_method(module, "transition", transition);
    vm.define_singleton_method(module, "frame_reset", frame_reset);

    // 属性
    vm.define_singleton_method(module, "frame_rate", frame_rate);
    vm.define_singleton_method(module, "frame_rate=", set_frame_rate);
    vm.define_singleton_method(module, "frame_count", frame_count);
    vm.define_singleton_method(module, "frame_count=", set_frame_count);
    vm.define_singleton_method(module, "brightness", brightness);
    vm.define_singleton_method(module, "brightness=", set_brightness);
    vm.define_singleton_method(module, "width", width);
    vm.define_singleton_method(module, "height", height);

    // 画面
    vm.define_singleton_method(module, "resize_screen", resize_screen);
    vm.define_singleton_method(module, "play_movie", play_movie);
    vm.define_singleton_method(module, "snap_to_bitmap", snap_to_bitmap);
}
