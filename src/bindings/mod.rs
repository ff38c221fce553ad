//! Script binding layer.
//!
//! Every script-visible class and module is registered here. Trampolines share one shape,
//! `fn(&mut ScriptRuntime, &Value, &[Value]) -> VmResult<Value>`, decode their arguments with
//! [`args`] and reach the engine through the [`SharedState`](crate::core::SharedState)
//! attached to the runtime.
//!
//! ```text
//!  script call ──► trampoline ──► get_args ──► subsystem / wrapped data
//!                      │                              │
//!                      ◄──── raise_native (remap) ◄───┘ NativeError
//! ```

#[macro_use]
mod util;

pub mod args;
pub mod audio;
pub mod color;
pub mod filesystem;
pub mod font;
pub mod graphics;
pub mod input;
pub mod kernel;
pub mod scene;
pub mod table;


use crate::config::ScriptConfig;
use crate::scripting::ScriptRuntime;

/// Installs the exception table and registers every binding for the configured RGSS version.
pub fn install(vm: &mut ScriptRuntime, config: &ScriptConfig) {
    vm.set_rgss_version(config.rgss_version);
    vm.init_exception_table(config.rgss_version);

    // 值类型
    color::register(vm);
    table::register(vm);
    font::register(vm);

    // 子系统模块
    graphics::register(vm);
    audio::register(vm);
    input::register(vm);
    filesystem::register(vm);

    // 场景对象
    scene::register(vm);

    kernel::register(vm, config);

    tracing::info!(
        target: "bindings",
        rgss_version = config.rgss_version,
        arity = ?vm.arity_policy(),
        "bindings installed"
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use crate::config::EngineConfig;
    use crate::core::SharedState;
    use crate::platform::{bridge, HostHandle};
    use crate::scripting::{ScriptRuntime, Value};

    /// A runtime with every binding installed and a shared state rooted in a temp directory.
    pub fn engine_vm() -> (TempDir, ScriptRuntime, HostHandle) {
        let dir = TempDir::new().unwrap();
        let mut config = EngineConfig::default();
        config.script.game_directory = dir.path().to_path_buf();

        let (host_bridge, host) = bridge();
        let shared = SharedState::new(&config, host_bridge).unwrap();
        let mut vm = ScriptRuntime::with_arity(config.script.arity);
        vm.attach_shared_state(shared);
        super::install(&mut vm, &config.script);
        (dir, vm, host)
    }

    pub fn module(vm: &ScriptRuntime, name: &str) -> Value {
        vm.const_lookup(name).unwrap()
    }
}
