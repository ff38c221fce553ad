use std::collections::BTreeMap;

use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::input::Button;
use serde::{Deserialize, Serialize};

/// 输入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// 按住多少帧后开始连发
    pub repeat_start: u32,

    /// 连发间隔（帧）
    pub repeat_interval: u32,

    /// 按钮到键码的映射，键为按钮名（`DOWN`、`C` 等）
    #[serde(default = "default_key_bindings")]
    pub key_bindings: BTreeMap<String, Vec<u8>>,
}

impl_default!(InputConfig {
    repeat_start: 24,
    repeat_interval: 6,
    key_bindings: default_key_bindings(),
});

impl InputConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.repeat_interval == 0 {
            return Err(ConfigError::ValidationError(
                "Repeat interval must be positive".to_string(),
            ));
        }
        for name in self.key_bindings.keys() {
            if Button::from_name(name).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown button in key bindings: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// 默认键盘映射（浏览器键码）
fn default_key_bindings() -> BTreeMap<String, Vec<u8>> {
    let bindings: [(&str, &[u8]); 12] = [
        ("DOWN", &[40, 83]),
        ("LEFT", &[37, 65]),
        ("RIGHT", &[39, 68]),
        ("UP", &[38, 87]),
        ("A", &[16]),
        ("B", &[27, 88, 96]),
        ("C", &[13, 32, 90]),
        ("X", &[49]),
        ("Y", &[50]),
        ("Z", &[51]),
        ("L", &[33]),
        ("R", &[34]),
    ];
    bindings
        .into_iter()
        .map(|(name, keys)| (name.to_string(), keys.to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_cover_all_buttons() {
        let config = InputConfig::default();
        assert!(config.validate().is_ok());
        for button in Button::ALL {
            assert!(config.key_bindings.contains_key(button.name()));
        }
    }

    #[test]
    fn test_unknown_button_rejected() {
        let mut config = InputConfig::default();
        config.key_bindings.insert("JUMP".to_string(), vec![32]);
        assert!(config.validate().is_err());
    }
}
