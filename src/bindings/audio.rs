//! Audio module bindings.
//!
//! Each channel gets `*_play`, `*_stop` and `*_fade`. RGSS3 adds a start position to the
//! BGM/BGS play calls plus `bgm_pos`, `bgs_pos` and `setup_midi`.

use super::args::Arg;
use super::util::{no_args, with_shared, with_shared_mut};
use crate::platform::AudioChannel;
use crate::scripting::{NativeFn, ScriptRuntime, Value, VmResult};

fn play(
    vm: &mut ScriptRuntime,
    channel: AudioChannel,
    args: &[Value],
    with_pos: bool,
) -> VmResult<Value> {
    let mut file = "";
    let mut volume = 100;
    let mut pitch = 100;
    let mut pos = 0.0;
    if with_pos {
        vm.get_args(
            args,
            "z|iif",
            &mut [
                Arg::Str(&mut file),
                Arg::Int(&mut volume),
                Arg::Int(&mut pitch),
                Arg::Float(&mut pos),
            ],
        )?;
    } else {
        vm.get_args(
            args,
            "z|ii",
            &mut [Arg::Str(&mut file), Arg::Int(&mut volume), Arg::Int(&mut pitch)],
        )?;
    }
    with_shared_mut(vm, |s| s.audio.play(channel, file, volume, pitch, pos));
    Ok(Value::Nil)
}

fn stop(vm: &mut ScriptRuntime, channel: AudioChannel, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    with_shared_mut(vm, |s| s.audio.stop(channel));
    Ok(Value::Nil)
}

fn fade(vm: &mut ScriptRuntime, channel: AudioChannel, args: &[Value]) -> VmResult<Value> {
    let mut time = 0;
    vm.get_args(args, "i", &mut [Arg::Int(&mut time)])?;
    with_shared_mut(vm, |s| s.audio.fade(channel, time));
    Ok(Value::Nil)
}

fn pos(vm: &mut ScriptRuntime, channel: AudioChannel, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Float(with_shared(vm, 0.0, |s| s.audio.position(channel))))
}

/// Declares the trampolines for one channel.
macro_rules! channel_bindings {
    ($channel:expr, $play:ident, $play_rgss3:ident, $stop:ident, $fade:ident) => {
        fn $play(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            play(vm, $channel, args, false)
        }

        fn $play_rgss3(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            play(vm, $channel, args, true)
        }

        fn $stop(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            stop(vm, $channel, args)
        }

        fn $fade(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
            fade(vm, $channel, args)
        }
    };
}

channel_bindings!(AudioChannel::Bgm, bgm_play, bgm_play_at, bgm_stop, bgm_fade);
channel_bindings!(AudioChannel::Bgs, bgs_play, bgs_play_at, bgs_stop, bgs_fade);
channel_bindings!(AudioChannel::Me, me_play, me_play_at, me_stop, me_fade);
channel_bindings!(AudioChannel::Se, se_play, se_play_at, se_stop, se_fade);

fn bgm_pos(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    pos(vm, AudioChannel::Bgm, args)
}

fn bgs_pos(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    pos(vm, AudioChannel::Bgs, args)
}

fn setup_midi(vm: &mut ScriptRuntime, _this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    with_shared_mut(vm, |s| s.audio.setup_midi());
    Ok(Value::Nil)
}

pub fn register(vm: &mut ScriptRuntime) {
    let module = vm.define_module("Audio");
    let rgss3 = vm.rgss_version() >= 3;

    // (name, play without position, play with position, stop, fade)
    let channels: [(&str, NativeFn, NativeFn, NativeFn, NativeFn); 4] = [
        ("bgm", bgm_play, bgm_play_at, bgm_stop, bgm_fade),
        ("bgs", bgs_play, bgs_play_at, bgs_stop, bgs_fade),
        ("me", me_play, me_play_at, me_stop, me_fade),
        ("se", se_play, se_play_at, se_stop, se_fade),
    ];
    for (name, play, play_at, stop, fade) in channels {
        // ME/SE 没有起始位置参数
        let positional = rgss3 && matches!(name, "bgm" | "bgs");
        let play = if positional { play_at } else { play };
        vm.define_singleton_method(module, &format!("{}_play", name), play);
        vm.define_singleton_method(module, &format!("{}_stop", name), stop);
        vm.define_singleton_method(module, &format!("{}_fade", name), fade);
    }

    if rgss3 {
        vm.define_singleton_method(module, "bgm_pos", bgm_pos);
        vm.define_singleton_method(module, "bgs_pos", bgs_pos);
        vm.define_singleton_method(module, "setup_midi", setup_midi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::test_support::{engine_vm, module};
    use crate::platform::BridgeCommand;

    #[test]
    fn test_bgm_play_defaults() {
        let (_dir, mut vm, host) = engine_vm();
        let audio = module(&vm, "Audio");
        vm.call(&audio, "bgm_play", &[Value::from("Audio/BGM/Theme1")]).unwrap();

        let state = vm.shared().unwrap().audio.channel(AudioChannel::Bgm).clone();
        assert_eq!(state.file.as_deref(), Some("Audio/BGM/Theme1"));
        assert_eq!((state.volume, state.pitch, state.position), (100, 100, 0.0));
        assert!(host
            .poll_commands()
            .iter()
            .any(|cmd| matches!(cmd, BridgeCommand::Play { channel: AudioChannel::Bgm, .. })));
    }

    #[test]
    fn test_se_play_rejects_position() {
        let (_dir, mut vm, _host) = engine_vm();
        let audio = module(&vm, "Audio");
        let args = [
            Value::from("Audio/SE/Decision1"),
            Value::Int(80),
            Value::Int(100),
            Value::Float(1.5),
        ];
        let err = vm.call(&audio, "se_play", &args).unwrap_err();
        assert_eq!(
            err.exception().unwrap().message,
            "wrong number of arguments (given 4, expected 1..3)"
        );
        vm.call(&audio, "bgs_play", &args).unwrap();
    }

    #[test]
    fn test_position_tracks_frames() {
        let (_dir, mut vm, _host) = engine_vm();
        let audio = module(&vm, "Audio");
        let graphics = module(&vm, "Graphics");
        vm.call(&audio, "bgm_play", &[Value::from("a"), Value::Int(100), Value::Int(100), Value::Float(2.0)])
            .unwrap();
        vm.call(&graphics, "wait", &[Value::Int(60)]).unwrap();
        match vm.call(&audio, "bgm_pos", &[]).unwrap() {
            Value::Float(pos) => assert!((pos - 3.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }

        vm.call(&audio, "bgm_stop", &[]).unwrap();
        assert_eq!(vm.call(&audio, "bgm_pos", &[]).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_rgss1_surface() {
        let mut vm = ScriptRuntime::new();
        vm.set_rgss_version(1);
        register(&mut vm);
        let audio = module(&vm, "Audio");
        let err = vm.call(&audio, "bgm_play", &[Value::from("a"), Value::Int(1), Value::Int(100), Value::Float(0.0)])
            .unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "RuntimeError");
        let err = vm.call(&audio, "setup_midi", &[]).unwrap_err();
        assert_eq!(err.exception().unwrap().class_name, "NoMethodError");
        assert_eq!(vm.call(&audio, "me_fade", &[Value::Int(100)]).unwrap(), Value::Nil);
    }
}
