//! 引擎主入口
//!
//! 定义Engine结构和脚本执行循环

use crate::bindings;
use crate::config::{EngineConfig, LoggingConfig};
use crate::platform::{bridge, BridgeCommand, HostHandle};
use crate::scripting::{ScriptProgram, ScriptRuntime, Unwind};

use super::error::{EngineError, EngineResult};
use super::shared_state::SharedState;

/// 脚本程序结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// 所有脚本段正常执行完毕
    Finished,
    /// 脚本或宿主请求退出
    Terminated,
}

/// 游戏引擎主结构
///
/// `Engine` 是引擎的核心入口点，负责：
/// - 初始化日志、共享状态和脚本运行时
/// - 安装脚本绑定
/// - 执行脚本程序并处理重置与退出
///
/// # 示例
///
/// ```no_run
/// use rgss_engine::config::EngineConfig;
/// use rgss_engine::core::{Engine, ExitReason};
/// use rgss_engine::scripting::{ScriptProgram, Value};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let (mut engine, _host) = Engine::new(EngineConfig::load_or_default())?;
///     let program = ScriptProgram::new().section("Main", |_vm| Ok(Value::Nil));
///     assert_eq!(engine.execute(&program)?, ExitReason::Finished);
///     engine.shutdown();
///     Ok(())
/// }
/// ```
///
/// # 生命周期
///
/// 1. **初始化阶段**：验证配置、建立宿主桥接、创建共享状态、安装绑定
/// 2. **运行阶段**：按顺序执行脚本段；重置信号会重新开始整个程序
/// 3. **关闭阶段**：释放所有脚本对象，清理异常表和共享状态
pub struct Engine {
    config: EngineConfig,
    runtime: ScriptRuntime,
}

impl Engine {
    /// 创建引擎，返回引擎和宿主侧桥接端点
    pub fn new(config: EngineConfig) -> EngineResult<(Self, HostHandle)> {
        config.validate()?;
        Self::initialize_logging(&config.logging);

        let (engine_side, host) = bridge();
        let shared = SharedState::new(&config, engine_side)?;

        let mut runtime = ScriptRuntime::with_arity(config.script.arity);
        runtime.attach_shared_state(shared);
        bindings::install(&mut runtime, &config.script);

        tracing::info!(
            target: "engine",
            rgss_version = config.script.rgss_version,
            width = config.graphics.width,
            height = config.graphics.height,
            "Engine initialized"
        );
        Ok((Self { config, runtime }, host))
    }

    /// 初始化日志系统
    ///
    /// 日志级别优先取 `RUST_LOG` 环境变量，未设置时使用配置的级别。
    /// 重复初始化会被忽略。
    fn initialize_logging(logging: &LoggingConfig) {
        if !logging.log_to_console {
            return;
        }
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level.as_filter()));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        tracing::info!(target: "engine", "Engine starting");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn runtime(&self) -> &ScriptRuntime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut ScriptRuntime {
        &mut self.runtime
    }

    /// 执行脚本程序
    ///
    /// 顶层的重置信号会执行重置处理并从头重新运行程序；
    /// 普通异常会报告给宿主并作为 [`EngineError::Script`] 返回。
    pub fn execute(&mut self, program: &ScriptProgram) -> EngineResult<ExitReason> {
        loop {
            match program.run(&mut self.runtime) {
                Ok(()) => {
                    tracing::info!(target: "engine", "Script program finished");
                    return Ok(ExitReason::Finished);
                }
                Err(Unwind::Reset) => {
                    tracing::info!(target: "engine", "Reset reached top level, restarting scripts");
                    if let Some(shared) = self.runtime.shared_mut() {
                        shared.process_reset();
                    }
                    self.runtime.gc();
                }
                Err(Unwind::Terminate) => {
                    tracing::info!(target: "engine", "Script requested termination");
                    return Ok(ExitReason::Terminated);
                }
                Err(Unwind::Raise(exc)) => {
                    tracing::error!(
                        target: "engine",
                        class = %exc.class_name,
                        backtrace = ?exc.backtrace,
                        "Script error: {}",
                        exc.message
                    );
                    if let Some(shared) = self.runtime.shared() {
                        shared.bridge.send(BridgeCommand::ScriptError {
                            class: exc.class_name.clone(),
                            message: exc.message.clone(),
                            backtrace: exc.backtrace.clone(),
                        });
                    }
                    return Err(EngineError::Script(exc));
                }
            }
        }
    }

    /// 关闭引擎，返回被卸下的共享状态
    pub fn shutdown(mut self) -> Option<SharedState> {
        tracing::info!(target: "engine", "Engine shutting down");
        self.runtime.teardown()
    }
}
