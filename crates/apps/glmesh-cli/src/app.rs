use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use glmesh_model::FileStore;
use glmesh_wire::Address;

use crate::commands_codec;
use crate::commands_scene;
use crate::commands_zone;
use crate::config::CliConfig;
use crate::output::Output;

#[derive(Debug, Clone, Parser)]
#[command(name = "glmesh", about = "GL mesh vendor message and scene tool", version)]
pub struct Cli {
    /// Configuration file (default: <config dir>/glmesh/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding zones.json and scenes.json
    #[arg(long)]
    pub state_dir: Option<PathBuf>,
    /// Vendor company identifier, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_u16)]
    pub company_id: Option<u16>,
    #[arg(long)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the opcode of a message kind
    Opcode { kind: String },
    /// Encode a vendor request into access-layer bytes
    Encode { kind: String, value: Option<String> },
    /// Decode a received vendor status
    Decode { opcode: String, payload: String },
    Scene(SceneCommand),
    Zone(ZoneCommand),
}

#[derive(Debug, Clone, Args)]
pub struct SceneCommand {
    #[command(subcommand)]
    pub action: SceneAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SceneAction {
    List,
    Add {
        #[arg(value_parser = parse_u16)]
        number: u16,
        name: String,
        #[arg(long)]
        detail: Option<String>,
    },
    Remove {
        #[arg(value_parser = parse_u16)]
        number: u16,
    },
    Rename {
        #[arg(value_parser = parse_u16)]
        number: u16,
        name: String,
    },
    /// Record that an element stored the scene
    Register {
        #[arg(value_parser = parse_u16)]
        number: u16,
        address: Address,
    },
    Unregister {
        #[arg(value_parser = parse_u16)]
        number: u16,
        address: Address,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ZoneCommand {
    #[command(subcommand)]
    pub action: ZoneAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ZoneAction {
    List,
    Add { number: u8, name: String },
    Remove { number: u8 },
    Rename { number: u8, name: String },
    /// Move a node into a zone; zone 0 unassigns
    Assign { number: u8, address: Address },
    Unassign { address: Address },
    /// Show or set a node's installation coordinate label
    Coord { address: Address, label: Option<String> },
}

pub fn parse_u16(raw: &str) -> Result<u16, String> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => raw.parse(),
    };
    parsed.map_err(|err| format!("{raw:?}: {err}"))
}

pub struct RuntimeContext {
    pub company_id: u16,
    pub state_dir: PathBuf,
    pub output: Output,
}

impl RuntimeContext {
    pub fn new(cli: &Cli, config: &CliConfig) -> Self {
        Self {
            company_id: cli.company_id.unwrap_or(config.company_id),
            state_dir: cli.state_dir.clone().unwrap_or_else(|| config.state_dir()),
            output: Output::new(cli.json),
        }
    }

    pub fn scenes_file(&self) -> FileStore {
        FileStore::new(&self.state_dir.join("scenes.json"))
    }

    pub fn zones_file(&self) -> FileStore {
        FileStore::new(&self.state_dir.join("zones.json"))
    }
}

pub fn run(cli: Cli, config: &CliConfig, out: &mut dyn Write) -> Result<()> {
    let ctx = RuntimeContext::new(&cli, config);
    log::debug!("glmesh: company 0x{:04X}, state in {}", ctx.company_id, ctx.state_dir.display());
    match &cli.command {
        Command::Opcode { kind } => commands_codec::opcode(&ctx, out, kind),
        Command::Encode { kind, value } => {
            commands_codec::encode(&ctx, out, kind, value.as_deref())
        }
        Command::Decode { opcode, payload } => commands_codec::decode(&ctx, out, opcode, payload),
        Command::Scene(command) => commands_scene::run(&ctx, out, command),
        Command::Zone(command) => commands_zone::run(&ctx, out, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_id_flag_overrides_config() {
        let cli = Cli::try_parse_from(["glmesh", "--company-id", "0x1234", "opcode", "scene"])
            .expect("parse");
        let ctx = RuntimeContext::new(&cli, &CliConfig::default());
        assert_eq!(ctx.company_id, 0x1234);
    }

    #[test]
    fn scene_numbers_accept_hex() {
        let cli = Cli::try_parse_from(["glmesh", "scene", "add", "0x10", "Dinner"]).expect("parse");
        match cli.command {
            Command::Scene(SceneCommand { action: SceneAction::Add { number, .. } }) => {
                assert_eq!(number, 16);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parse_u16_rejects_overflow() {
        assert!(parse_u16("70000").is_err());
        assert_eq!(parse_u16(" 0841 "), Ok(841));
    }
}
