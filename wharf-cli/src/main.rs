//! Wharf CLI
//!
//! Command-line interface for running the Wharf build worker.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "wharf")]
#[command(about = "Wharf package build worker CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wharf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    commands::handle_command(cli.command).await
}
