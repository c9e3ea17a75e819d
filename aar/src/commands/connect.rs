//! Integration connection command.

use aar_core::integrations::ALL;
use anyhow::Result;
use colored::Colorize;
use dialoguer::Password;

use crate::api::ApiClient;
use crate::config::Config;

/// Store an integration credential for the logged-in user
pub async fn execute(integration: &str, token: Option<String>, config: &Config) -> Result<()> {
    if !ALL.contains(&integration) {
        println!(
            "{} Unknown integration '{}'. Supported: {}",
            "✗".red(),
            integration,
            ALL.join(", ").cyan()
        );
        return Ok(());
    }

    if config.stored_token().is_none() {
        println!("{} Not logged in. Run {} first.", "✗".red(), "aar auth login".cyan());
        return Ok(());
    }

    // Prompt rather than require the secret on the command line
    let token = match token {
        Some(t) => t,
        None => Password::new()
            .with_prompt(format!("{integration} token"))
            .interact()?,
    };

    let api = ApiClient::new(config)?;
    api.connect(integration, &token).await?;

    println!("{} Connected {}", "✓".green(), integration.cyan());
    Ok(())
}
