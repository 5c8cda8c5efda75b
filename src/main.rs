mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use echomind::config::EchoConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "echomind", version, about = "EchoMind AI backend: voice wellness sessions and usage metering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server
    Serve,
    /// Check database health
    Doctor,
    /// Show a user's usage counters
    Usage {
        /// Identity provider user id
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = EchoConfig::load()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            echomind::server::serve(config).await?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
        Command::Usage { user_id } => {
            cli::usage::usage(&config, &user_id)?;
        }
    }

    Ok(())
}
