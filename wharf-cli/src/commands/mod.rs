//! CLI commands

mod build;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Build a repository into installable packages
    Build(build::BuildArgs),
}

/// Routes commands to their handlers.
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Build(args) => build::handle(args).await,
    }
}
