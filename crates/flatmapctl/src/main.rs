//! flatmapctl - record and query flatmap entities in a knowledge base

use anyhow::Result;
use clap::Parser;
use flatmapctl::cli::Cli;
use flatmapctl::{commands, logging, settings};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = settings::resolve(&cli)?;
    debug!("Using knowledge base {}", config.db_path().display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli, &config, &mut out)
}
