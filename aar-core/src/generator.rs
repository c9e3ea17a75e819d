//! Report generator client.
//!
//! Turns a merged activity dataset into after-action report text by calling
//! a local Ollama instance. Generation is the slow, costly step the report
//! cache exists to avoid; failures surface to the caller and nothing is
//! cached on the way out.

use crate::error::{Error, Result};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

const DEFAULT_MODEL: &str = "llama3";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Produces report text from a merged dataset.
#[async_trait::async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, data: &Map<String, Value>) -> Result<String>;
}

/// Generator backed by Ollama's `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_model(base_url, DEFAULT_MODEL)
    }

    pub fn with_model(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl ReportGenerator for OllamaGenerator {
    async fn generate(&self, data: &Map<String, Value>) -> Result<String> {
        let prompt = build_prompt(data);
        debug!(model = %self.model, prompt_bytes = prompt.len(), "Requesting report generation");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "model endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let text = body["response"].as_str().unwrap_or("").trim();
        if text.is_empty() {
            return Err(Error::Generation("model returned empty text".to_string()));
        }

        Ok(text.to_string())
    }
}

/// Assemble the after-action prompt from whichever integrations responded
fn build_prompt(data: &Map<String, Value>) -> String {
    let mut prompt = String::from("Analyze the following data for the past week:\n");

    if data.is_empty() {
        prompt.push_str("(no integration data available this week)\n");
    }
    for (integration, dataset) in data {
        prompt.push_str(&format!("{integration}: {dataset}\n"));
    }

    prompt.push_str(
        "\nProvide a report addressing:\n\
         1. How the user spent their time.\n\
         2. What worked and improved.\n\
         3. What didn't work.\n\
         4. New standards for excellence.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_each_integration() {
        let mut data = Map::new();
        data.insert("notion".to_string(), json!({ "db1": [1, 2] }));
        data.insert("clockify".to_string(), json!({ "time_entries": [] }));

        let prompt = build_prompt(&data);
        assert!(prompt.contains("notion: {\"db1\":[1,2]}"));
        assert!(prompt.contains("clockify:"));
        assert!(!prompt.contains("github:"));
    }

    #[test]
    fn test_prompt_for_empty_dataset() {
        let prompt = build_prompt(&Map::new());

        // Generation still proceeds with zero integrations connected
        assert!(prompt.contains("no integration data available"));
        assert!(prompt.contains("New standards for excellence"));
    }
}
