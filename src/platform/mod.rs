//! 平台桥接
//!
//! 引擎侧持有 [`HostBridge`]（发送命令、接收事件），宿主侧持有 [`HostHandle`]。
//! 两端通过 crossbeam 无界通道连接。

pub mod protocol;

pub use protocol::*;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// 命令发送端，可在子系统之间克隆共享
#[derive(Debug, Clone)]
pub struct BridgeSender {
    tx: Sender<BridgeCommand>,
}

impl BridgeSender {
    /// 发送命令；宿主已断开时丢弃
    pub fn send(&self, cmd: BridgeCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::trace!(target: "bridge", "host disconnected, command dropped");
        }
    }

    /// 不连接任何宿主的发送端
    pub fn detached() -> Self {
        let (tx, _rx) = unbounded();
        Self { tx }
    }
}

/// 引擎侧桥接端点
#[derive(Debug)]
pub struct HostBridge {
    pub commands: BridgeSender,
    pub events: Receiver<HostEvent>,
}

impl HostBridge {
    /// 取出所有待处理的宿主事件
    pub fn drain_events(&self) -> Vec<HostEvent> {
        self.events.try_iter().collect()
    }
}

/// 宿主侧桥接端点
#[derive(Debug, Clone)]
pub struct HostHandle {
    commands: Receiver<BridgeCommand>,
    events: Sender<HostEvent>,
}

impl HostHandle {
    /// 取出引擎发出的所有命令
    pub fn poll_commands(&self) -> Vec<BridgeCommand> {
        self.commands.try_iter().collect()
    }

    /// 以 JSON 形式取出命令（供浏览器宿主使用）
    pub fn poll_commands_json(&self) -> serde_json::Result<Vec<String>> {
        self.poll_commands()
            .iter()
            .map(serde_json::to_string)
            .collect()
    }

    /// 向引擎发送事件；引擎已关闭时返回 false
    pub fn send_event(&self, event: HostEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// 解析 JSON 事件并发送
    pub fn send_event_json(&self, json: &str) -> serde_json::Result<bool> {
        let event: HostEvent = serde_json::from_str(json)?;
        Ok(self.send_event(event))
    }

    /// 把待处理命令交给适配器执行，并转发适配器产生的事件
    pub fn pump(&self, adapter: &mut impl HostAdapter) -> usize {
        let commands = self.poll_commands();
        let count = commands.len();
        for cmd in commands {
            adapter.execute_command(cmd);
        }
        for event in adapter.poll_events() {
            self.send_event(event);
        }
        count
    }
}

/// 创建一对相连的桥接端点
pub fn bridge() -> (HostBridge, HostHandle) {
    let (command_tx, command_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    (
        HostBridge {
            commands: BridgeSender { tx: command_tx },
            events: event_rx,
        },
        HostHandle {
            commands: command_rx,
            events: event_tx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        seen: Vec<BridgeCommand>,
    }

    impl HostAdapter for RecordingHost {
        fn execute_command(&mut self, cmd: BridgeCommand) {
            self.seen.push(cmd);
        }

        fn poll_events(&mut self) -> Vec<HostEvent> {
            vec![HostEvent::ResetRequested]
        }
    }

    #[test]
    fn test_bridge_round_trip() {
        let (engine_side, host) = bridge();
        engine_side.commands.send(BridgeCommand::Freeze);
        engine_side.commands.send(BridgeCommand::SetupMidi);

        let mut adapter = RecordingHost::default();
        assert_eq!(host.pump(&mut adapter), 2);
        assert_eq!(adapter.seen, vec![BridgeCommand::Freeze, BridgeCommand::SetupMidi]);
        assert_eq!(engine_side.drain_events(), vec![HostEvent::ResetRequested]);
    }

    #[test]
    fn test_json_endpoints() {
        let (engine_side, host) = bridge();
        engine_side.commands.send(BridgeCommand::MessageBox {
            text: "hi".to_string(),
        });
        let json = host.poll_commands_json().unwrap();
        assert_eq!(json, vec![r#"{"type":"message_box","text":"hi"}"#.to_string()]);

        assert!(host
            .send_event_json(r#"{"type":"terminate_requested"}"#)
            .unwrap());
        assert_eq!(engine_side.drain_events(), vec![HostEvent::TerminateRequested]);
    }

    #[test]
    fn test_detached_sender_drops_silently() {
        BridgeSender::detached().send(BridgeCommand::Freeze);
    }
}
