mod cli;
mod commands;

use ak_core::config::load_config;
use ak_core::logging::init_logging;
use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = load_config(&cli.root, cli.config.as_deref()).await?;
    if let Err(err) = init_logging(&config.generator.logging) {
        eprintln!("Logging disabled: {err}");
    }
    tracing::debug!(root = %config.project_root.display(), "Configuration loaded");

    commands::run(cli.command, config, cli.json).await
}
