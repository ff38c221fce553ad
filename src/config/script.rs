use std::path::PathBuf;

use super::{ConfigError, ConfigResult};
use crate::bindings::args::ArityPolicy;
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 脚本运行时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// RGSS 版本 (1 = XP, 2 = VX, 3 = VX Ace)
    pub rgss_version: u8,

    /// 多余参数的处理方式
    #[serde(default)]
    pub arity: ArityPolicy,

    /// 测试模式 (`$TEST`)
    pub test_mode: bool,

    /// 战斗测试 (`$BTEST`)
    pub battle_test: bool,

    /// 游戏目录，文件系统以此为根
    pub game_directory: PathBuf,
}

impl_default!(ScriptConfig {
    rgss_version: 3,
    arity: ArityPolicy::Strict,
    test_mode: false,
    battle_test: false,
    game_directory: PathBuf::from("."),
});

impl ScriptConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=3).contains(&self.rgss_version) {
            return Err(ConfigError::ValidationError(format!(
                "Unsupported RGSS version {}",
                self.rgss_version
            )));
        }
        Ok(())
    }
}
