//! Weekly report command.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::Config;

/// Fetch the weekly after-action report
pub async fn execute(json: bool, config: &Config) -> Result<()> {
    if config.stored_token().is_none() {
        println!("{} Not logged in. Run {} first.", "✗".red(), "aar auth login".cyan());
        return Ok(());
    }

    let api = ApiClient::new(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Generating report (cached reports return immediately)...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = api.report().await;
    spinner.finish_and_clear();

    let report = result?;

    if json {
        println!("{}", serde_json::json!({ "report": report }));
    } else {
        println!("{}", "── After-Action Report ──".bold());
        println!();
        println!("{report}");
    }

    Ok(())
}
