//! Account commands.
//!
//! Registers accounts, manages the stored bearer token, and shows login and
//! integration status.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Password;
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;

use crate::api::ApiClient;
use crate::cli::AuthAction;
use crate::config::Config;

/// Handle auth commands
pub async fn execute(action: AuthAction, config: &Config) -> Result<()> {
    match action {
        AuthAction::Register { email } => register(&email, config).await,
        AuthAction::Login { email, token_name } => login(&email, token_name, config).await,
        AuthAction::Logout => logout(config).await,
        AuthAction::Status => status(config).await,
    }
}

/// Register a new account
async fn register(email: &str, config: &Config) -> Result<()> {
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let api = ApiClient::new(config)?;
    let user = api.register(email, &password).await?;

    println!("{} Registered {}", "✓".green(), user.email.cyan());
    println!("  Log in with: {}", format!("aar auth login {email}").cyan());
    Ok(())
}

/// Log in and store the issued bearer token
async fn login(email: &str, token_name: Option<String>, config: &Config) -> Result<()> {
    let token_file = config.token_file();

    if config.stored_token().is_some() {
        println!("{} Already logged in.", "✓".green());
        println!(
            "  Use {} to discard the current token first.",
            "aar auth logout".cyan()
        );
        return Ok(());
    }

    let password = Password::new().with_prompt("Password").interact()?;

    let token_name = token_name.or_else(|| {
        hostname::get()
            .ok()
            .map(|h| format!("aar-cli-{}", h.to_string_lossy()))
    });

    let api = ApiClient::new(config)?;
    let raw_key = api.login(email, &password, token_name).await?;

    // Save token with restricted permissions
    if let Some(parent) = token_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&token_file, &raw_key)?;
    fs::set_permissions(&token_file, Permissions::from_mode(0o600))?;

    println!("{} Login successful!", "✓".green());
    println!(
        "  Token saved to {}",
        token_file.display().to_string().cyan()
    );
    Ok(())
}

/// Revoke the token server-side and remove it locally
async fn logout(config: &Config) -> Result<()> {
    let token_file = config.token_file();

    if config.stored_token().is_none() {
        println!("{} Not logged in.", "·".yellow());
        return Ok(());
    }

    // Best-effort revocation; the local copy goes away regardless
    let api = ApiClient::new(config)?;
    if api.logout().await.is_err() {
        println!("{} Server unreachable, removing local token only.", "·".yellow());
    }

    fs::remove_file(&token_file)?;
    println!("{} Logged out.", "✓".green());
    Ok(())
}

/// Show login and integration status
async fn status(config: &Config) -> Result<()> {
    let api = ApiClient::new(config)?;

    if !api.health_check().await? {
        println!(
            "{} aar-server is not reachable at {}",
            "✗".red(),
            config.api.url.cyan()
        );
        return Ok(());
    }
    println!("{} Server reachable at {}", "✓".green(), config.api.url.cyan());

    if config.stored_token().is_none() {
        println!("{} Not logged in.", "·".yellow());
        return Ok(());
    }

    match api.current_user().await {
        Ok(user) => {
            println!("{} Logged in as {}", "✓".green(), user.email.cyan());
            for (name, connected) in [
                ("notion", user.integrations.notion),
                ("github", user.integrations.github),
                ("clockify", user.integrations.clockify),
            ] {
                if connected {
                    println!("  {} {}", "✓".green(), name);
                } else {
                    println!("  {} {} (not connected)", "·".yellow(), name);
                }
            }
        }
        Err(_) => {
            println!("{} Stored token was rejected. Log in again.", "✗".red());
        }
    }

    Ok(())
}
