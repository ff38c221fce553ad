//! 图形子系统
//!
//! 记录帧计数、帧率、亮度和画面尺寸，并把每帧的渲染请求发送给宿主。

use crate::config::graphics::{GraphicsConfig, MAX_FRAME_RATE, MIN_FRAME_RATE};
use crate::core::error::{NativeError, NativeResult};
use crate::platform::{BridgeCommand, BridgeSender};

/// 亮度上限
pub const MAX_BRIGHTNESS: i32 = 255;

#[derive(Debug)]
pub struct Graphics {
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
    frame_rate: u32,
    frame_count: i64,
    brightness: i32,
    frozen: bool,
    bridge: BridgeSender,
}

impl Graphics {
    pub fn new(config: &GraphicsConfig, bridge: BridgeSender) -> Self {
        Self {
            width: config.width,
            height: config.height,
            max_width: config.max_width,
            max_height: config.max_height,
            frame_rate: config.frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE),
            frame_count: 0,
            brightness: MAX_BRIGHTNESS,
            frozen: false,
            bridge,
        }
    }

    /// 推进一帧
    pub fn update(&mut self) {
        self.frame_count += 1;
        self.bridge.send(BridgeCommand::FrameRendered {
            frame: self.frame_count,
            brightness: self.brightness as u8,
        });
    }

    /// 冻结当前画面，为渐变做准备
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.bridge.send(BridgeCommand::Freeze);
    }

    /// 从冻结画面渐变到当前画面
    pub fn transition(&mut self, duration: i32, filename: &str, vague: i32) -> NativeResult<()> {
        if duration < 0 {
            return Err(NativeError::argument(format!(
                "transition duration must not be negative ({})",
                duration
            )));
        }
        self.frozen = false;
        self.bridge.send(BridgeCommand::Transition {
            duration,
            filename: filename.to_string(),
            vague: vague.clamp(1, 256),
        });
        Ok(())
    }

    /// 重置帧计时（游戏重置时调用）
    pub fn frame_reset(&mut self) {
        self.frame_count = 0;
        self.frozen = false;
        self.brightness = MAX_BRIGHTNESS;
        tracing::debug!(target: "graphics", "frame reset");
    }

    /// 调整画面尺寸，截断到 1..=最大尺寸
    pub fn resize_screen(&mut self, width: i32, height: i32) {
        self.width = clamp_dimension(width, self.max_width);
        self.height = clamp_dimension(height, self.max_height);
        self.bridge.send(BridgeCommand::ResizeScreen {
            width: self.width,
            height: self.height,
        });
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, rate: i32) {
        self.frame_rate = rate.clamp(MIN_FRAME_RATE as i32, MAX_FRAME_RATE as i32) as u32;
    }

    pub fn frame_count(&self) -> i64 {
        self.frame_count
    }

    pub fn set_frame_count(&mut self, count: i64) {
        self.frame_count = count;
    }

    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, value: i32) {
        self.brightness = value.clamp(0, MAX_BRIGHTNESS);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// 渐变第 `step` 帧（共 `frames` 帧）的亮度
    pub fn fade_level(from: i32, to: i32, step: i32, frames: i32) -> i32 {
        if frames <= 0 {
            return to;
        }
        let delta = i64::from(to) - i64::from(from);
        (i64::from(from) + delta * i64::from(step) / i64::from(frames)) as i32
    }
}

fn clamp_dimension(value: i32, max: u32) -> u32 {
    (value.max(1) as u32).min(max.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::bridge;

    #[test]
    fn test_update_emits_frames() {
        let (engine_side, host) = bridge();
        let mut graphics = Graphics::new(&GraphicsConfig::default(), engine_side.commands);
        graphics.update();
        graphics.update();

        assert_eq!(graphics.frame_count(), 2);
        let commands = host.poll_commands();
        assert_eq!(
            commands.last(),
            Some(&BridgeCommand::FrameRendered {
                frame: 2,
                brightness: 255
            })
        );
    }

    #[test]
    fn test_clamping() {
        let mut graphics = Graphics::new(&GraphicsConfig::default(), BridgeSender::detached());
        graphics.set_frame_rate(500);
        assert_eq!(graphics.frame_rate(), 120);
        graphics.set_frame_rate(1);
        assert_eq!(graphics.frame_rate(), 10);
        graphics.set_brightness(-20);
        assert_eq!(graphics.brightness(), 0);
        graphics.resize_screen(1024, 0);
        assert_eq!((graphics.width(), graphics.height()), (640, 1));
    }

    #[test]
    fn test_transition_and_reset() {
        let mut graphics = Graphics::new(&GraphicsConfig::default(), BridgeSender::detached());
        graphics.freeze();
        assert!(graphics.is_frozen());
        assert!(graphics.transition(-1, "", 40).is_err());
        graphics.transition(8, "", 40).unwrap();
        assert!(!graphics.is_frozen());

        graphics.update();
        graphics.set_brightness(10);
        graphics.frame_reset();
        assert_eq!(graphics.frame_count(), 0);
        assert_eq!(graphics.brightness(), 255);
    }

    #[test]
    fn test_fade_level_zero_frames() {
        assert_eq!(Graphics::fade_level(255, 0, 0, 0), 0);
        assert_eq!(Graphics::fade_level(255, 0, 5, 10), 128);
    }

    #[test]
    fn test_fade_level_long_durations() {
        assert_eq!(Graphics::fade_level(255, 0, 9_000_000, 9_000_000), 0);
        assert_eq!(Graphics::fade_level(255, 0, 4_500_000, 9_000_000), 128);
        assert_eq!(Graphics::fade_level(0, 255, i32::MAX, i32::MAX), 255);
    }
}
