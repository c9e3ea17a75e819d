//! GitHub integration client.
//!
//! Multi-step fetch: enumerate the user's repositories, then collect
//! commits, issues, and pull requests per repository. Commits and issues
//! are window-filtered server-side via `since`; pull requests are fetched
//! with `state=all` and filtered client-side (included if either created-at
//! or updated-at falls within the window).

use super::IntegrationClient;
use crate::error::{Error, Result};
use crate::window::ActivityWindow;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("aar/", env!("CARGO_PKG_VERSION"));

pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API.to_string())
    }

    /// Custom API root (tests)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn get_json(&self, token: &str, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::integration_fetch(
                super::GITHUB,
                format!("{} returned HTTP {}", path, response.status()),
            ));
        }

        Ok(response.json().await?)
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IntegrationClient for GithubClient {
    fn name(&self) -> &'static str {
        super::GITHUB
    }

    async fn fetch_recent_activity(
        &self,
        token: &str,
        window: &ActivityWindow,
    ) -> Result<Value> {
        let since = window.start_rfc3339();

        let repos = self.get_json(token, "/user/repos", &[]).await?;
        let repos = repos.as_array().cloned().unwrap_or_default();
        debug!(repos = repos.len(), "Querying GitHub repositories");

        let mut commits = Vec::new();
        let mut issues = Vec::new();
        let mut prs = Vec::new();

        for repo in &repos {
            let Some(full_name) = repo["full_name"].as_str() else {
                continue;
            };

            let repo_commits = self
                .get_json(
                    token,
                    &format!("/repos/{full_name}/commits"),
                    &[("since", since.clone())],
                )
                .await?;
            commits.extend(repo_commits.as_array().cloned().unwrap_or_default());

            let repo_issues = self
                .get_json(
                    token,
                    &format!("/repos/{full_name}/issues"),
                    &[("since", since.clone())],
                )
                .await?;
            issues.extend(repo_issues.as_array().cloned().unwrap_or_default());

            let repo_prs = self
                .get_json(
                    token,
                    &format!("/repos/{full_name}/pulls"),
                    &[("state", "all".to_string())],
                )
                .await?;
            prs.extend(
                repo_prs
                    .as_array()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|pr| pull_in_window(pr, window)),
            );
        }

        Ok(json!({
            "commits": commits,
            "issues": issues,
            "prs": prs,
        }))
    }
}

/// Pull request inclusion filter: created or updated within the window
fn pull_in_window(pr: &Value, window: &ActivityWindow) -> bool {
    [&pr["created_at"], &pr["updated_at"]]
        .iter()
        .filter_map(|field| field.as_str())
        .filter_map(parse_timestamp)
        .any(|t| window.contains(t))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
