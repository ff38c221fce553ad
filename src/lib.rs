//! # RGSS Engine
//!
//! An RGSS-compatible game engine runtime: it hosts a script runtime, exposes the engine
//! subsystems (graphics, audio, input, filesystem) to scripts through a typed binding layer,
//! and forwards rendering/audio work to a host over a command bridge.
//!
//! ## Features
//!
//! - **Binding layer**: format-string argument decoding, typed object wrapping with disposal
//!   tracking, native-failure to script-exception remapping
//! - **Script runtime model**: classes, modules, objects, symbols, garbage collection and
//!   reset/terminate signals
//! - **Subsystems**: state-keeping Graphics, Audio, Input and Filesystem objects
//! - **Host bridge**: serializable command/event protocol for a browser or desktop host
//!
//! ### Example
//!
//! ```no_run
//! use rgss_engine::config::EngineConfig;
//! use rgss_engine::core::Engine;
//! use rgss_engine::scripting::{ScriptProgram, Value};
//!
//! let (mut engine, _host) = Engine::new(EngineConfig::default()).unwrap();
//! let program = ScriptProgram::new().section("Main", |vm| {
//!     let audio = vm.const_lookup("Audio")?;
//!     vm.call(&audio, "bgm_play", &[Value::from("Audio/BGM/Theme1"), Value::Int(80)])
//! });
//! engine.execute(&program).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: driver, shared state and error types
//! - [`scripting`]: the script runtime model
//! - [`bindings`]: the script-visible surface
//! - [`config`]: engine configuration

/// Driver, shared engine state and error types
pub mod core;
/// Configuration system
pub mod config;
/// Host bridge protocol
pub mod platform;
/// Script runtime model (values, classes, objects, exceptions)
pub mod scripting;
/// Script bindings for the engine subsystems
pub mod bindings;
/// Native objects owned by script handles
pub mod domain;
/// Graphics subsystem
pub mod graphics;
/// Audio subsystem
pub mod audio;
/// Input subsystem
pub mod input;
/// Game filesystem
pub mod filesystem;
