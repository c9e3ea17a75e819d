//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// After-Action Report CLI
///
/// Weekly activity summaries from your connected tools.
#[derive(Parser, Debug)]
#[command(name = "aar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account management (register, login, logout, status)
    Auth(AuthCommand),

    /// Connect an integration by storing its credential token
    Connect {
        /// Integration name (notion, github, clockify)
        integration: String,
        /// Credential token for the integration (prompted if omitted)
        token: Option<String>,
    },

    /// Generate (or fetch the cached) weekly after-action report
    Report {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Register a new account
    Register {
        /// Account email
        email: String,
    },

    /// Log in and store a bearer token
    Login {
        /// Account email
        email: String,
        /// Label for the issued token (defaults to this hostname)
        #[arg(long)]
        token_name: Option<String>,
    },

    /// Remove the stored bearer token
    Logout,

    /// Show login and integration status
    Status,
}
