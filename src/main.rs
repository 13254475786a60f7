use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dexcodec::application::{Cli, CommandExecutor};
use dexcodec::config::{Config, LoggingCfg};

/// RUST_LOG wins over the configured level; logs go to stderr so stdout stays JSON
fn init_tracing(cfg: &LoggingCfg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if cfg.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;
    init_tracing(&config.logging);

    tracing::debug!(config = %cli.config.display(), dexes = config.dexes.len(), "config loaded");
    CommandExecutor::execute(cli.command, config).await
}
