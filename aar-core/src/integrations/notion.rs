//! Notion integration client.
//!
//! Two-step fetch: enumerate the databases the credential can see via the
//! search API, then query each database for pages edited within the window.
//! The result is keyed by database id.

use super::IntegrationClient;
use crate::error::{Error, Result};
use crate::window::ActivityWindow;
use serde_json::{json, Map, Value};
use tracing::debug;

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    pub fn new() -> Self {
        Self::with_base_url(NOTION_API.to_string())
    }

    /// Custom API root (tests)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Enumerate database ids visible to the credential
    async fn list_database_ids(&self, token: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "filter": { "property": "object", "value": "database" }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::integration_fetch(
                super::NOTION,
                format!("search returned HTTP {}", response.status()),
            ));
        }

        let body: Value = response.json().await?;
        let ids = body["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|db| db["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ids)
    }

    /// Query one database for pages edited after the window start
    async fn query_database(
        &self,
        token: &str,
        database_id: &str,
        window: &ActivityWindow,
    ) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/databases/{}/query", self.base_url, database_id))
            .bearer_auth(token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "filter": {
                    "timestamp": "last_edited_time",
                    "last_edited_time": { "after": window.start_rfc3339() }
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::integration_fetch(
                super::NOTION,
                format!("database {} returned HTTP {}", database_id, response.status()),
            ));
        }

        let body: Value = response.json().await?;
        Ok(body["results"].clone())
    }
}

impl Default for NotionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IntegrationClient for NotionClient {
    fn name(&self) -> &'static str {
        super::NOTION
    }

    async fn fetch_recent_activity(
        &self,
        token: &str,
        window: &ActivityWindow,
    ) -> Result<Value> {
        let database_ids = self.list_database_ids(token).await?;
        debug!(databases = database_ids.len(), "Querying Notion databases");

        let mut data = Map::new();
        for database_id in database_ids {
            let results = self.query_database(token, &database_id, window).await?;
            data.insert(database_id, results);
        }

        Ok(Value::Object(data))
    }
}
