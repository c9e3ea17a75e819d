//! Clockify integration client.
//!
//! Resolves the credential's user and default workspace first, then pulls
//! the user's time entries bounded by the window.

use super::IntegrationClient;
use crate::error::{Error, Result};
use crate::window::ActivityWindow;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

const CLOCKIFY_API: &str = "https://api.clockify.me/api/v1";

pub struct ClockifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClockifyClient {
    pub fn new() -> Self {
        Self::with_base_url(CLOCKIFY_API.to_string())
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
            .header("X-Api-Key", token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::integration_fetch(
                super::CLOCKIFY,
                format!("{} returned HTTP {}", path, response.status()),
            ));
        }

        Ok(response.json().await?)
    }
}

impl Default for ClockifyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IntegrationClient for ClockifyClient {
    fn name(&self) -> &'static str {
        super::CLOCKIFY
    }

    async fn fetch_recent_activity(
        &self,
        token: &str,
        window: &ActivityWindow,
    ) -> Result<Value> {
        let user = self.get_json(token, "/user", &[]).await?;

        let workspace_id = user["defaultWorkspace"].as_str().ok_or_else(|| {
            Error::integration_fetch(super::CLOCKIFY, "user has no default workspace")
        })?;
        let user_id = user["id"]
            .as_str()
            .ok_or_else(|| Error::integration_fetch(super::CLOCKIFY, "user response missing id"))?;

        let time_entries = self
            .get_json(
                token,
                &format!("/workspaces/{workspace_id}/user/{user_id}/time-entries"),
                &[
                    ("start", clockify_timestamp(window.start)),
                    ("end", clockify_timestamp(window.end)),
                ],
            )
            .await?;

        Ok(json!({ "time_entries": time_entries }))
    }
}

/// Clockify requires second precision with a literal `Z` suffix
fn clockify_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
