//! 场景对象
//!
//! 可释放的显示对象。这里只保存脚本可见的属性，绘制由宿主负责。

use crate::impl_default;

/// 不透明度上限
pub const MAX_OPACITY: i32 = 255;

/// 位图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: i32,
    pub height: i32,
    /// 从文件加载时的路径
    pub source: Option<String>,
}

impl Bitmap {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            source: None,
        }
    }

    pub fn from_file(path: &str) -> Self {
        Self {
            width: 0,
            height: 0,
            source: Some(path.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub ox: i32,
    pub oy: i32,
    pub opacity: i32,
    pub visible: bool,
}

impl_default!(Sprite {
    x: 0,
    y: 0,
    z: 0,
    ox: 0,
    oy: 0,
    opacity: MAX_OPACITY,
    visible: true,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub z: i32,
    pub ox: i32,
    pub oy: i32,
    pub opacity: i32,
    pub visible: bool,
}

impl_default!(Plane {
    z: 0,
    ox: 0,
    oy: 0,
    opacity: MAX_OPACITY,
    visible: true,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub z: i32,
    pub ox: i32,
    pub oy: i32,
    pub visible: bool,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            z: 0,
            ox: 0,
            oy: 0,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub z: i32,
    pub opacity: i32,
    pub visible: bool,
    pub active: bool,
}

impl_default!(Window {
    x: 0,
    y: 0,
    width: 0,
    height: 0,
    z: 0,
    opacity: MAX_OPACITY,
    visible: true,
    active: true,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    pub ox: i32,
    pub oy: i32,
    pub visible: bool,
}

impl_default!(Tilemap {
    ox: 0,
    oy: 0,
    visible: true,
});

/// 不透明度截断到 0..=255
pub fn clamp_opacity(value: i32) -> i32 {
    value.clamp(0, MAX_OPACITY)
}
