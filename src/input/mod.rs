//! 输入子系统
//!
//! 宿主通过按键事件更新 256 个原始键状态；每帧 `update` 推进按住帧数，
//! 脚本按 RGSS 按钮或原始键码查询按下、触发和连发状态。

use std::collections::HashMap;

use crate::config::InputConfig;

/// 原始键数量
pub const KEY_COUNT: usize = 256;

/// RGSS 按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Down = 2,
    Left = 4,
    Right = 6,
    Up = 8,
    A = 11,
    B = 12,
    C = 13,
    X = 14,
    Y = 15,
    Z = 16,
    L = 17,
    R = 18,
}

impl Button {
    pub const ALL: [Button; 12] = [
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Up,
        Button::A,
        Button::B,
        Button::C,
        Button::X,
        Button::Y,
        Button::Z,
        Button::L,
        Button::R,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::Up => "UP",
            Button::A => "A",
            Button::B => "B",
            Button::C => "C",
            Button::X => "X",
            Button::Y => "Y",
            Button::Z => "Z",
            Button::L => "L",
            Button::R => "R",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.name() == name)
    }
}

#[derive(Debug)]
pub struct Input {
    pressed: [bool; KEY_COUNT],
    held_frames: [u32; KEY_COUNT],
    bindings: HashMap<Button, Vec<u8>>,
    repeat_start: u32,
    repeat_interval: u32,
}

impl Input {
    pub fn new(config: &InputConfig) -> Self {
        let bindings = config
            .key_bindings
            .iter()
            .filter_map(|(name, keys)| Button::from_name(name).map(|b| (b, keys.clone())))
            .collect();
        Self {
            pressed: [false; KEY_COUNT],
            held_frames: [0; KEY_COUNT],
            bindings,
            repeat_start: config.repeat_start,
            repeat_interval: config.repeat_interval.max(1),
        }
    }

    /// 宿主按键事件
    pub fn set_key_state(&mut self, code: u8, pressed: bool) {
        self.pressed[code as usize] = pressed;
    }

    /// 推进一帧
    pub fn update(&mut self) {
        for (held, pressed) in self.held_frames.iter_mut().zip(self.pressed.iter()) {
            *held = if *pressed { held.saturating_add(1) } else { 0 };
        }
    }

    /// 按钮码映射到键码；不是按钮码时按原始键码处理
    fn keys_for(&self, code: i32) -> Vec<u8> {
        if let Some(button) = Button::from_code(code) {
            return self.bindings.get(&button).cloned().unwrap_or_default();
        }
        u8::try_from(code).map(|key| vec![key]).unwrap_or_default()
    }

    fn any_key(&self, code: i32, test: impl Fn(u32) -> bool) -> bool {
        self.keys_for(code)
            .into_iter()
            .any(|key| test(self.held_frames[key as usize]))
    }

    pub fn is_pressed(&self, code: i32) -> bool {
        self.any_key(code, |held| held > 0)
    }

    pub fn is_triggered(&self, code: i32) -> bool {
        self.any_key(code, |held| held == 1)
    }

    /// 第一帧触发，之后按住超过 `repeat_start` 帧每 `repeat_interval` 帧触发一次
    pub fn is_repeating(&self, code: i32) -> bool {
        let (start, interval) = (self.repeat_start, self.repeat_interval);
        self.any_key(code, |held| {
            held == 1 || (held > start && (held - start) % interval == 0)
        })
    }

    /// 四方向：只按下一个方向时返回 2/4/6/8，否则 0
    pub fn dir4(&self) -> i32 {
        let pressed: Vec<Button> = [Button::Down, Button::Left, Button::Right, Button::Up]
            .into_iter()
            .filter(|button| self.is_pressed(button.code()))
            .collect();
        match pressed.as_slice() {
            [only] => only.code(),
            _ => 0,
        }
    }

    /// 八方向：组合斜向（1/3/7/9），相反方向互相抵消
    pub fn dir8(&self) -> i32 {
        let vertical = match (
            self.is_pressed(Button::Down.code()),
            self.is_pressed(Button::Up.code()),
        ) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        };
        let horizontal = match (
            self.is_pressed(Button::Left.code()),
            self.is_pressed(Button::Right.code()),
        ) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        };
        match (vertical, horizontal) {
            (0, 0) => 0,
            (v, h) => 5 + h + 3 * v,
        }
    }

    /// 原始键状态
    pub fn raw_key_states(&self) -> Vec<bool> {
        self.pressed.to_vec()
    }
}
