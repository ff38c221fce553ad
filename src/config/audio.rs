/// 音频配置

use serde::{Deserialize, Serialize};
use super::{ConfigResult, ConfigError};

/// 音频配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// 主音量 (0.0 - 1.0)，作用于发送给宿主的所有音量
    pub master_volume: f32,

    /// 是否静音
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            muted: false,
        }
    }
}

impl AudioConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::ValidationError("Invalid master volume".to_string()));
        }
        Ok(())
    }

    /// 实际生效的主音量
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume
        }
    }
}
