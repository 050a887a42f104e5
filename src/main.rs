use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swapflow::application::{Cli, CommandExecutor};
use swapflow::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    // Config file is optional, every key has a default
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
