use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 最低帧率
pub const MIN_FRAME_RATE: u32 = 10;
/// 最高帧率
pub const MAX_FRAME_RATE: u32 = 120;

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// 初始画面宽度（像素）
    pub width: u32,

    /// 初始画面高度（像素）
    pub height: u32,

    /// `resize_screen` 允许的最大宽度
    pub max_width: u32,

    /// `resize_screen` 允许的最大高度
    pub max_height: u32,

    /// 目标帧率
    pub frame_rate: u32,
}

impl_default!(GraphicsConfig {
    width: 640,
    height: 480,
    max_width: 640,
    max_height: 480,
    frame_rate: 60,
});

impl GraphicsConfig {
    pub fn new() -> Self {
        Self::default()
    }
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid resolution".to_string(),
            ));
        }
        if self.width > self.max_width || self.height > self.max_height {
            return Err(ConfigError::ValidationError(format!(
                "Resolution {}x{} exceeds maximum {}x{}",
                self.width, self.height, self.max_width, self.max_height
            )));
        }
        if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(ConfigError::ValidationError(format!(
                "Frame rate must be between {} and {}",
                MIN_FRAME_RATE, MAX_FRAME_RATE
            )));
        }
        Ok(())
    }
}
