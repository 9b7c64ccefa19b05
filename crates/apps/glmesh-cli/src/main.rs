use std::io;

use anyhow::Result;
use clap::Parser;
use glmesh_cli::{Cli, CliConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    glmesh_cli::run(cli, &config, &mut out)
}
