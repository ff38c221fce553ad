use rgss_engine::config::EngineConfig;
use rgss_engine::core::{Engine, ExitReason};
use rgss_engine::platform::{BridgeCommand, HostAdapter};
use rgss_engine::scripting::{ScriptProgram, Value};

/// Prints what a real host would display.
struct ConsoleHost;

impl HostAdapter for ConsoleHost {
    fn execute_command(&mut self, cmd: BridgeCommand) {
        match cmd {
            BridgeCommand::MessageBox { text } => println!("[msgbox] {}", text),
            BridgeCommand::Console { text } => println!("{}", text),
            BridgeCommand::ScriptError { class, message, .. } => {
                eprintln!("script error: {} ({})", message, class)
            }
            other => tracing::debug!(target: "host", command = ?other, "host command"),
        }
    }
}

fn demo_program() -> ScriptProgram {
    ScriptProgram::new().section("Main", |vm| {
        let audio = vm.const_lookup("Audio")?;
        vm.call(&audio, "bgm_play", &[Value::from("Audio/BGM/Theme1"), Value::Int(80)])?;

        let graphics = vm.const_lookup("Graphics")?;
        vm.call(&graphics, "wait", &[Value::Int(60)])?;
        let frames = vm.call(&graphics, "frame_count", &[])?;

        let msgbox = if vm.rgss_version() >= 3 { "msgbox" } else { "print" };
        vm.call_function(msgbox, &[Value::from("frames rendered: "), frames])
    })
}

fn main() {
    let (mut engine, host) = match Engine::new(EngineConfig::load_or_default()) {
        Ok(started) => started,
        Err(e) => {
            eprintln!("Engine failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let result = engine.execute(&demo_program());
    host.pump(&mut ConsoleHost);
    engine.shutdown();

    match result {
        Ok(ExitReason::Finished) => {}
        Ok(ExitReason::Terminated) => println!("terminated by request"),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
