//! `glmesh`: inspect vendor opcodes and payloads, and edit the persisted
//! scene and zone state of a network.

pub mod app;
pub mod commands_codec;
pub mod commands_scene;
pub mod commands_zone;
pub mod config;
pub mod output;

pub use app::{run, Cli, Command};
pub use config::CliConfig;
