/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量和运行时动态调整
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod audio;
pub mod font;
pub mod graphics;
pub mod input;
pub mod script;

pub use audio::AudioConfig;
pub use font::FontConfig;
pub use graphics::GraphicsConfig;
pub use input::InputConfig;
pub use script::ScriptConfig;

/// 引擎配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 引擎主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 输入配置
    #[serde(default)]
    pub input: InputConfig,

    /// 脚本运行时配置
    #[serde(default)]
    pub script: ScriptConfig,

    /// 字体默认值
    #[serde(default)]
    pub font: FontConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        // 图形配置
        if let Ok(val) = env::var("ENGINE_GRAPHICS_WIDTH") {
            if let Ok(width) = val.parse() {
                self.graphics.width = width;
            }
        }
        if let Ok(val) = env::var("ENGINE_GRAPHICS_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.graphics.height = height;
            }
        }
        if let Ok(val) = env::var("ENGINE_GRAPHICS_FRAME_RATE") {
            if let Ok(rate) = val.parse() {
                self.graphics.frame_rate = rate;
            }
        }

        // 脚本配置
        if let Ok(val) = env::var("ENGINE_SCRIPT_RGSS_VERSION") {
            if let Ok(version) = val.parse() {
                self.script.rgss_version = version;
            }
        }
        if let Ok(val) = env::var("ENGINE_SCRIPT_TEST_MODE") {
            self.script.test_mode = val.parse().unwrap_or(self.script.test_mode);
        }

        // 音频配置
        if let Ok(val) = env::var("ENGINE_AUDIO_MASTER_VOLUME") {
            if let Ok(volume) = val.parse() {
                self.audio.master_volume = volume;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.graphics.validate()?;
        self.audio.validate()?;
        self.input.validate()?;
        self.script.validate()?;
        self.font.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./config.toml
    /// 2. ./config.json
    /// 3. ~/.config/rgss_engine/config.toml
    /// 4. 使用默认配置
    ///
    /// 找到的配置会再应用环境变量覆盖。
    pub fn load_or_default() -> Self {
        let mut config = Self::discover();
        config.apply_env_overrides();
        config
    }

    fn discover() -> Self {
        let mut candidates = vec![PathBuf::from("config.toml"), PathBuf::from("config.json")];
        if let Some(home) = env::var_os("HOME") {
            candidates.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("rgss_engine")
                    .join("config.toml"),
            );
        }

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            let loaded = if path.extension().is_some_and(|ext| ext == "json") {
                Self::from_json_file(&path)
            } else {
                Self::from_toml_file(&path)
            };
            match loaded {
                Ok(config) => {
                    tracing::info!(target: "config", "Loaded config from {:?}", path);
                    return config;
                }
                // 存在但无法解析的文件不应被静默忽略
                Err(e) => tracing::warn!(target: "config", "Ignoring {:?}: {}", path, e),
            }
        }

        // 使用默认配置
        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 未设置时使用）
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// EnvFilter 指令
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::args::ArityPolicy;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.graphics.width, 640);
        assert_eq!(config.script.rgss_version, 3);
    }

    #[test]
    fn test_toml_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.graphics.width, parsed.graphics.width);
        assert_eq!(config.input.key_bindings, parsed.input.key_bindings);
    }

    #[test]
    fn test_json_serialization() {
        let config = EngineConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config.graphics.height, parsed.graphics.height);
        assert_eq!(config.script.arity, parsed.script.arity);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [script]
            rgss_version = 1
            arity = "lenient"
            "#,
        )
        .unwrap();
        assert_eq!(config.script.rgss_version, 1);
        assert_eq!(config.script.arity, ArityPolicy::Lenient);
        assert_eq!(config.graphics.frame_rate, 60);
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [graphics]
            width = 544
            height = 416

            [font]
            default_size = 24

            [logging]
            log_to_console = false
            "#,
        )
        .unwrap();
        assert_eq!((config.graphics.width, config.graphics.height), (544, 416));
        assert_eq!(config.graphics.frame_rate, 60);
        assert_eq!(config.graphics.max_width, 640);
        assert_eq!(config.font.default_size, 24);
        assert!(!config.logging.log_to_console);
        assert_eq!(config.script.rgss_version, ScriptConfig::default().rgss_version);
        assert!(config.validate().is_ok());

        let config = EngineConfig::from_json_str(r#"{"script": {"rgss_version": 2}, "input": {"repeat_start": 12}}"#)
            .unwrap();
        assert_eq!(config.script.rgss_version, 2);
        assert_eq!(config.script.arity, ArityPolicy::Strict);
        assert_eq!(config.input.repeat_start, 12);
        assert_eq!(config.input.repeat_interval, 6);
        assert!(!config.input.key_bindings.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("graphics = 3").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = EngineConfig::default();
        config.font.default_size = 22;
        config.save_toml(&path).unwrap();

        let loaded = EngineConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.font.default_size, 22);
    }
}
