//! API client for the aar-server backend.
//!
//! Thin reqwest wrapper used by the CLI commands for:
//! - Account registration and login
//! - Connecting integrations
//! - Fetching the weekly report

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

/// API client for aar-server.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client from config, picking up any stored token.
    pub fn new(config: &Config) -> Result<Self> {
        // Report generation can take a while on a cold cache
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(180))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api.url.clone(),
            token: config.stored_token(),
        })
    }

    /// Build request with auth headers.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("API request: {} {}", method, url);
        let mut req = self.client.request(method, &url);

        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Check API health.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self.request(reqwest::Method::GET, "/health").send().await;
        Ok(response.map(|r| r.status().is_success()).unwrap_or(false))
    }

    /// Register a new account.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .request(reqwest::Method::POST, "/auth/register")
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Log in, returning a freshly issued bearer token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        token_name: Option<String>,
    ) -> Result<String> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            token_name,
        };

        let response = self
            .request(reqwest::Method::POST, "/auth/login")
            .json(&body)
            .send()
            .await?;

        let login: LoginResponse = Self::parse(response).await?;
        Ok(login.access_token)
    }

    /// Store an integration credential for the logged-in user.
    pub async fn connect(&self, integration: &str, token: &str) -> Result<()> {
        let body = ConnectRequest {
            token: token.to_string(),
        };

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/api/connect/{integration}"),
            )
            .json(&body)
            .send()
            .await?;

        let _: ConnectResponse = Self::parse(response).await?;
        Ok(())
    }

    /// Get the current user.
    pub async fn current_user(&self) -> Result<UserResponse> {
        let response = self.request(reqwest::Method::GET, "/api/user").send().await?;
        Self::parse(response).await
    }

    /// Revoke the current bearer token server-side.
    pub async fn logout(&self) -> Result<()> {
        self.request(reqwest::Method::POST, "/api/logout")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Generate (or fetch the cached) weekly report.
    pub async fn report(&self) -> Result<String> {
        let response = self
            .request(reqwest::Method::GET, "/api/report")
            .send()
            .await?;

        let report: ReportResponse = Self::parse(response).await?;
        Ok(report.report)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .context("Failed to parse server response");
        }

        let detail = response.text().await.unwrap_or_default();
        bail!("API error {status}: {detail}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    pub integration: String,
    pub connected: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub integrations: IntegrationStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationStatus {
    pub notion: bool,
    pub github: bool,
    pub clockify: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportResponse {
    pub report: String,
}
