use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 字体默认值配置
///
/// 启动时写入共享状态，脚本可通过 `Font.default_*` 修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// 默认字体名（按优先级）
    pub default_name: Vec<String>,

    /// 默认字号
    pub default_size: i32,

    pub default_bold: bool,
    pub default_italic: bool,
    pub default_outline: bool,
    pub default_shadow: bool,
}

impl_default!(FontConfig {
    default_name: vec!["Arial".to_string()],
    default_size: 24,
    default_bold: false,
    default_italic: false,
    default_outline: true,
    default_shadow: false,
});

impl FontConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(6..=96).contains(&self.default_size) {
            return Err(ConfigError::ValidationError(format!(
                "Font size {} out of range 6..=96",
                self.default_size
            )));
        }
        Ok(())
    }
}
