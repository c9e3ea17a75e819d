//! aar - After-Action Report CLI
//!
//! Weekly activity summaries aggregated from Notion, GitHub, and Clockify.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("aar=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::Auth(cmd) => commands::auth::execute(cmd.action, &config).await,
        Commands::Connect { integration, token } => {
            commands::connect::execute(&integration, token, &config).await
        }
        Commands::Report { json } => commands::report::execute(json, &config).await,
        Commands::Version => {
            println!("aar {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
