use clap::Parser;
use codelens_core::{ConfigManager, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "codelens")]
#[command(about = "Codelens - plain-language code explanations and workspace skill profiles")]
#[command(version)]
struct Cli {
    /// Configuration file; discovered automatically when omitted
    #[arg(long, global = true, env = "CODELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let manager = ConfigManager::load(cli.config.as_deref()).await?;
    init_logging(&manager.config().logging, cli.verbose, cli.json_logs)?;

    commands::execute(cli.command, manager).await
}

/// `RUST_LOG` wins, then `--verbose`, then the configured level. Logs go to stderr.
fn init_logging(logging: &LoggingConfig, verbose: bool, json_logs: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json_logs || logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
