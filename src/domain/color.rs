//! 颜色值对象

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA 颜色，各分量限制在 0..=255
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64,
}

fn clamp_channel(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 255.0)
    }
}

impl Color {
    /// 创建颜色，超出范围的分量会被截断
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
            alpha: clamp_channel(alpha),
        }
    }

    /// 全零颜色
    pub fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn set(&mut self, red: f64, green: f64, blue: f64, alpha: f64) {
        *self = Self::new(red, green, blue, alpha);
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_red(&mut self, value: f64) {
        self.red = clamp_channel(value);
    }

    pub fn set_green(&mut self, value: f64) {
        self.green = clamp_channel(value);
    }

    pub fn set_blue(&mut self, value: f64) {
        self.blue = clamp_channel(value);
    }

    pub fn set_alpha(&mut self, value: f64) {
        self.alpha = clamp_channel(value);
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::transparent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}, {:.6})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_clamped() {
        let color = Color::new(300.0, -5.0, 128.5, f64::NAN);
        assert_eq!(color.red(), 255.0);
        assert_eq!(color.green(), 0.0);
        assert_eq!(color.blue(), 128.5);
        assert_eq!(color.alpha(), 0.0);
    }

    #[test]
    fn test_display() {
        let color = Color::new(255.0, 0.0, 0.0, 128.0);
        assert_eq!(
            color.to_string(),
            "(255.000000, 0.000000, 0.000000, 128.000000)"
        );
    }
}
