//! 字体
//!
//! 字体对象只记录属性，字形渲染由宿主完成。

use super::color::Color;
use crate::config::FontConfig;

/// 字体默认值，新建字体时复制
#[derive(Debug, Clone, PartialEq)]
pub struct FontDefaults {
    pub name: Vec<String>,
    pub size: i32,
    pub bold: bool,
    pub italic: bool,
    pub outline: bool,
    pub shadow: bool,
    pub color: Color,
    pub out_color: Color,
}

impl Default for FontDefaults {
    fn default() -> Self {
        Self::from_config(&FontConfig::default())
    }
}

impl FontDefaults {
    pub fn from_config(config: &FontConfig) -> Self {
        Self {
            name: config.default_name.clone(),
            size: config.default_size,
            bold: config.default_bold,
            italic: config.default_italic,
            outline: config.default_outline,
            shadow: config.default_shadow,
            color: Color::new(255.0, 255.0, 255.0, 255.0),
            out_color: Color::new(0.0, 0.0, 0.0, 128.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: Vec<String>,
    pub size: i32,
    pub bold: bool,
    pub italic: bool,
    pub outline: bool,
    pub shadow: bool,
    pub color: Color,
    pub out_color: Color,
}

impl Font {
    /// 创建字体；未指定的名称和非正字号取默认值
    pub fn new(name: Option<Vec<String>>, size: Option<i32>, defaults: &FontDefaults) -> Self {
        Self {
            name: name.unwrap_or_else(|| defaults.name.clone()),
            size: size.filter(|s| *s > 0).unwrap_or(defaults.size),
            bold: defaults.bold,
            italic: defaults.italic,
            outline: defaults.outline,
            shadow: defaults.shadow,
            color: defaults.color,
            out_color: defaults.out_color,
        }
    }

    /// 字体是否可用
    ///
    /// 字体由宿主提供，只要给出名称就视为存在。
    pub fn exists(name: Option<&str>) -> bool {
        name.map(|n| !n.is_empty()).unwrap_or(false)
    }
}
