//! 音频子系统
//!
//! 管理 BGM、BGS、ME、SE 四个通道的播放状态。实际解码和混音由宿主完成，
//! 这里负责参数截断、播放位置推进和淡出计时。

use std::collections::HashMap;

use crate::config::AudioConfig;
use crate::platform::{AudioChannel, BridgeCommand, BridgeSender};

pub const MAX_VOLUME: i32 = 100;
pub const MIN_PITCH: i32 = 50;
pub const MAX_PITCH: i32 = 150;

/// 单个通道的播放状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelState {
    pub file: Option<String>,
    pub volume: i32,
    pub pitch: i32,
    /// 播放位置（秒）
    pub position: f64,
    /// 剩余淡出时间（毫秒）
    pub fade_remaining_ms: Option<f64>,
}

impl ChannelState {
    pub fn is_playing(&self) -> bool {
        self.file.is_some()
    }

    fn stop(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
pub struct Audio {
    channels: HashMap<AudioChannel, ChannelState>,
    master_volume: f32,
    midi_ready: bool,
    bridge: BridgeSender,
}

impl Audio {
    pub fn new(config: &AudioConfig, bridge: BridgeSender) -> Self {
        Self {
            channels: AudioChannel::ALL
                .into_iter()
                .map(|channel| (channel, ChannelState::default()))
                .collect(),
            master_volume: config.effective_volume(),
            midi_ready: false,
            bridge,
        }
    }

    /// 开始播放；音量截断到 0..=100，音调截断到 50..=150
    pub fn play(&mut self, channel: AudioChannel, file: &str, volume: i32, pitch: i32, pos: f64) {
        let volume = volume.clamp(0, MAX_VOLUME);
        let pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        let pos = if pos.is_finite() { pos.max(0.0) } else { 0.0 };
        let state = self.channel_mut(channel);
        *state = ChannelState {
            file: Some(file.to_string()),
            volume,
            pitch,
            position: pos,
            fade_remaining_ms: None,
        };
        tracing::debug!(target: "audio", channel = channel.name(), file, volume, pitch, "play");
        self.bridge.send(BridgeCommand::Play {
            channel,
            file: file.to_string(),
            volume: self.scaled_volume(volume),
            pitch: pitch as u8,
            pos,
        });
    }

    pub fn stop(&mut self, channel: AudioChannel) {
        self.channel_mut(channel).stop();
        self.bridge.send(BridgeCommand::Stop { channel });
    }

    /// 在 `duration_ms` 毫秒内淡出，结束后通道停止
    pub fn fade(&mut self, channel: AudioChannel, duration_ms: i32) {
        let duration_ms = duration_ms.max(0);
        if !self.channel(channel).is_playing() {
            return;
        }
        if duration_ms == 0 {
            self.stop(channel);
            return;
        }
        self.channel_mut(channel).fade_remaining_ms = Some(f64::from(duration_ms));
        self.bridge.send(BridgeCommand::Fade {
            channel,
            duration_ms: duration_ms as u32,
        });
    }

    /// 当前播放位置（秒），未播放时为 0
    pub fn position(&self, channel: AudioChannel) -> f64 {
        self.channel(channel).position
    }

    pub fn channel(&self, channel: AudioChannel) -> &ChannelState {
        static IDLE: ChannelState = ChannelState {
            file: None,
            volume: 0,
            pitch: 0,
            position: 0.0,
            fade_remaining_ms: None,
        };
        self.channels.get(&channel).unwrap_or(&IDLE)
    }

    fn channel_mut(&mut self, channel: AudioChannel) -> &mut ChannelState {
        self.channels.entry(channel).or_default()
    }

    /// 推进一帧：播放位置前进 1/帧率 秒，淡出计时到期的通道停止
    pub fn update(&mut self, frame_rate: u32) {
        let dt = 1.0 / f64::from(frame_rate.max(1));
        for state in self.channels.values_mut() {
            if !state.is_playing() {
                continue;
            }
            state.position += dt;
            if let Some(remaining) = state.fade_remaining_ms.as_mut() {
                *remaining -= dt * 1000.0;
                if *remaining <= 0.0 {
                    state.stop();
                }
            }
        }
    }

    pub fn setup_midi(&mut self) {
        if !self.midi_ready {
            self.midi_ready = true;
            self.bridge.send(BridgeCommand::SetupMidi);
        }
    }

    /// 停止所有通道（游戏重置时调用）
    pub fn reset(&mut self) {
        for state in self.channels.values_mut() {
            state.stop();
        }
        self.bridge.send(BridgeCommand::AudioReset);
        tracing::debug!(target: "audio", "audio reset");
    }

    fn scaled_volume(&self, volume: i32) -> u8 {
        (volume as f32 * self.master_volume).round().clamp(0.0, MAX_VOLUME as f32) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::bridge;

    fn audio() -> Audio {
        Audio::new(&AudioConfig::default(), BridgeSender::detached())
    }

    #[test]
    fn test_play_clamps_parameters() {
        let (engine_side, host) = bridge();
        let mut audio = Audio::new(&AudioConfig::default(), engine_side.commands);
        audio.play(AudioChannel::Bgm, "Audio/BGM/Town", 150, 10, 0.0);

        let state = audio.channel(AudioChannel::Bgm);
        assert_eq!(state.volume, 100);
        assert_eq!(state.pitch, 50);
        assert_eq!(
            host.poll_commands(),
            vec![BridgeCommand::Play {
                channel: AudioChannel::Bgm,
                file: "Audio/BGM/Town".to_string(),
                volume: 100,
                pitch: 50,
                pos: 0.0,
            }]
        );
    }

    #[test]
    fn test_master_volume_scales_output() {
        let (engine_side, host) = bridge();
        let config = AudioConfig {
            master_volume: 0.5,
            muted: false,
        };
        let mut audio = Audio::new(&config, engine_side.commands);
        audio.play(AudioChannel::Se, "Audio/SE/Cursor", 80, 100, 0.0);
        match host.poll_commands().as_slice() {
            [BridgeCommand::Play { volume, .. }] => assert_eq!(*volume, 40),
            other => panic!("unexpected commands {:?}", other),
        }
    }

    #[test]
    fn test_position_advances_per_frame() {
        let mut audio = audio();
        audio.play(AudioChannel::Bgs, "Audio/BGS/Rain", 100, 100, 1.0);
        for _ in 0..60 {
            audio.update(60);
        }
        assert!((audio.position(AudioChannel::Bgs) - 2.0).abs() < 1e-9);
        assert_eq!(audio.position(AudioChannel::Bgm), 0.0);
    }

    #[test]
    fn test_fade_stops_after_duration() {
        let mut audio = audio();
        audio.play(AudioChannel::Bgm, "Audio/BGM/Battle", 100, 100, 0.0);
        audio.fade(AudioChannel::Bgm, 500);
        for _ in 0..15 {
            audio.update(32);
        }
        assert!(audio.channel(AudioChannel::Bgm).is_playing());
        audio.update(32);
        assert!(!audio.channel(AudioChannel::Bgm).is_playing());
    }

    #[test]
    fn test_reset_stops_everything() {
        let mut audio = audio();
        audio.play(AudioChannel::Bgm, "a", 100, 100, 0.0);
        audio.play(AudioChannel::Me, "b", 100, 100, 0.0);
        audio.reset();
        for channel in AudioChannel::ALL {
            assert!(!audio.channel(channel).is_playing());
        }
    }
}
