//! 子系统共享状态
//!
//! `SharedState` 是绑定层访问引擎子系统的唯一入口，由驱动创建并挂到脚本运行时上。

use crossbeam_channel::Receiver;

use crate::audio::Audio;
use crate::config::EngineConfig;
use crate::domain::FontDefaults;
use crate::filesystem::Filesystem;
use crate::graphics::Graphics;
use crate::input::Input;
use crate::platform::{BridgeCommand, BridgeSender, HostBridge, HostEvent};

use super::error::{NativeError, NativeResult};

/// 一帧结束后驱动应执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSignal {
    Continue,
    Reset,
    Terminate,
}

/// 引擎共享状态
#[derive(Debug)]
pub struct SharedState {
    pub graphics: Graphics,
    pub audio: Audio,
    pub input: Input,
    pub filesystem: Filesystem,
    /// `Font.default_*` 的当前值
    pub font_defaults: FontDefaults,
    pub bridge: BridgeSender,
    events: Receiver<HostEvent>,
    reset_requested: bool,
    terminate_requested: bool,
}

impl SharedState {
    pub fn new(config: &EngineConfig, bridge: HostBridge) -> NativeResult<Self> {
        let HostBridge { commands, events } = bridge;
        let filesystem = Filesystem::new(config.script.game_directory.clone());
        if !filesystem.root().is_dir() {
            return Err(NativeError::no_file(&filesystem.root().display().to_string()));
        }
        Ok(Self {
            graphics: Graphics::new(&config.graphics, commands.clone()),
            audio: Audio::new(&config.audio, commands.clone()),
            input: Input::new(&config.input),
            filesystem,
            font_defaults: FontDefaults::from_config(&config.font),
            bridge: commands,
            events,
            reset_requested: false,
            terminate_requested: false,
        })
    }

    /// 推进一帧：图形和音频更新，然后处理宿主事件
    ///
    /// 按键计时由 `Input.update` 推进，这里只记录按键状态。
    pub fn update_frame(&mut self) -> FrameSignal {
        self.graphics.update();
        self.audio.update(self.graphics.frame_rate());
        self.pump_events();
        self.take_signal()
    }

    /// `Input.update`：收取按键事件并推进按住帧数
    pub fn update_input(&mut self) {
        self.pump_events();
        self.input.update();
    }

    /// 处理所有待处理的宿主事件
    pub fn pump_events(&mut self) {
        for event in self.events.try_iter() {
            match event {
                HostEvent::Key { code, pressed } => self.input.set_key_state(code, pressed),
                HostEvent::ResetRequested => self.reset_requested = true,
                HostEvent::TerminateRequested => self.terminate_requested = true,
            }
        }
    }

    fn take_signal(&mut self) -> FrameSignal {
        if self.terminate_requested {
            self.terminate_requested = false;
            return FrameSignal::Terminate;
        }
        if self.reset_requested {
            self.reset_requested = false;
            return FrameSignal::Reset;
        }
        FrameSignal::Continue
    }

    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// 游戏重置：帧计时归零并停止所有音频
    pub fn process_reset(&mut self) {
        tracing::info!(target: "engine", "processing game reset");
        self.reset_requested = false;
        self.graphics.frame_reset();
        self.audio.reset();
    }

    /// 向宿主发送一条消息框
    pub fn message_box(&self, text: impl Into<String>) {
        self.bridge.send(BridgeCommand::MessageBox { text: text.into() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{bridge, AudioChannel};

    fn config_in(dir: &std::path::Path) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.script.game_directory = dir.to_path_buf();
        config
    }

    #[test]
    fn test_update_frame_forwards_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (engine_side, host) = bridge();
        let mut state = SharedState::new(&config_in(dir.path()), engine_side).unwrap();

        host.send_event(HostEvent::Key {
            code: 13,
            pressed: true,
        });
        assert_eq!(state.update_frame(), FrameSignal::Continue);
        assert!(!state.input.is_pressed(13));
        state.update_input();
        assert!(state.input.is_triggered(13));
        assert_eq!(state.graphics.frame_count(), 1);
    }

    #[test]
    fn test_update_frame_reports_signals() {
        let dir = tempfile::tempdir().unwrap();
        let (engine_side, host) = bridge();
        let mut state = SharedState::new(&config_in(dir.path()), engine_side).unwrap();

        host.send_event(HostEvent::ResetRequested);
        assert_eq!(state.update_frame(), FrameSignal::Reset);
        assert_eq!(state.update_frame(), FrameSignal::Continue);

        host.send_event(HostEvent::ResetRequested);
        host.send_event(HostEvent::TerminateRequested);
        assert_eq!(state.update_frame(), FrameSignal::Terminate);
    }

    #[test]
    fn test_missing_game_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (engine_side, _host) = bridge();
        let err = SharedState::new(&config_in(&dir.path().join("missing")), engine_side).unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::NoFile);
    }

    #[test]
    fn test_process_reset() {
        let dir = tempfile::tempdir().unwrap();
        let (engine_side, _host) = bridge();
        let mut state = SharedState::new(&config_in(dir.path()), engine_side).unwrap();

        state.audio.play(AudioChannel::Bgm, "Audio/BGM/Town", 100, 100, 0.0);
        state.update_frame();
        state.process_reset();
        assert_eq!(state.graphics.frame_count(), 0);
        assert!(!state.audio.channel(AudioChannel::Bgm).is_playing());
    }
}
