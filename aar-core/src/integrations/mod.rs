//! Integration clients.
//!
//! One client per upstream service. Each fetches a bounded time window of
//! raw activity for a single credential and returns the service's own JSON
//! shape untouched — the orchestrator only keys datasets by integration
//! name, it never reshapes them.

pub mod clockify;
pub mod github;
pub mod notion;

pub use clockify::ClockifyClient;
pub use github::GithubClient;
pub use notion::NotionClient;

use crate::error::Result;
use crate::window::ActivityWindow;
use serde_json::Value;
use std::sync::Arc;

pub const NOTION: &str = "notion";
pub const GITHUB: &str = "github";
pub const CLOCKIFY: &str = "clockify";

/// All supported integration names
pub const ALL: [&str; 3] = [NOTION, GITHUB, CLOCKIFY];

/// A stateless, credential-scoped client for one upstream service.
#[async_trait::async_trait]
pub trait IntegrationClient: Send + Sync {
    /// Integration name used as the merged-dataset key
    fn name(&self) -> &'static str;

    /// Fetch the user's raw activity within the window
    async fn fetch_recent_activity(&self, token: &str, window: &ActivityWindow)
        -> Result<Value>;
}

/// The standard client set, one per supported integration
pub fn default_clients() -> Vec<Arc<dyn IntegrationClient>> {
    vec![
        Arc::new(NotionClient::new()),
        Arc::new(GithubClient::new()),
        Arc::new(ClockifyClient::new()),
    ]
}
