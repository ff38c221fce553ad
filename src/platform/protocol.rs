//! Host Bridge Protocol
//!
//! The engine does not render or play audio itself. Subsystems emit commands that a host
//! (browser shell, desktop window, test harness) executes, and the host feeds input and
//! lifecycle events back.

use serde::{Deserialize, Serialize};

/// Audio channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioChannel {
    Bgm,
    Bgs,
    Me,
    Se,
}

impl AudioChannel {
    pub const ALL: [AudioChannel; 4] = [
        AudioChannel::Bgm,
        AudioChannel::Bgs,
        AudioChannel::Me,
        AudioChannel::Se,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AudioChannel::Bgm => "bgm",
            AudioChannel::Bgs => "bgs",
            AudioChannel::Me => "me",
            AudioChannel::Se => "se",
        }
    }
}

/// Commands sent from the engine to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeCommand {
    // Graphics
    FrameRendered {
        frame: i64,
        brightness: u8,
    },
    Freeze,
    Transition {
        duration: i32,
        filename: String,
        vague: i32,
    },
    ResizeScreen {
        width: u32,
        height: u32,
    },

    // Audio
    Play {
        channel: AudioChannel,
        file: String,
        volume: u8,
        pitch: u8,
        pos: f64,
    },
    Stop {
        channel: AudioChannel,
    },
    Fade {
        channel: AudioChannel,
        duration_ms: u32,
    },
    SetupMidi,
    AudioReset,

    // Script host
    MessageBox {
        text: String,
    },
    Console {
        text: String,
    },
    ScriptError {
        class: String,
        message: String,
        backtrace: Vec<String>,
    },
}

/// Events sent from the host to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Key { code: u8, pressed: bool },
    ResetRequested,
    TerminateRequested,
}

/// Trait for host-side command executors
pub trait HostAdapter {
    /// Execute a command emitted by the engine
    fn execute_command(&mut self, cmd: BridgeCommand);

    /// Poll for events to forward to the engine
    fn poll_events(&mut self) -> Vec<HostEvent> {
        Vec::new()
    }
}
