//! Database types for aar-core.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub notion_token: Option<String>,
    pub github_token: Option<String>,
    pub clockify_token: Option<String>,
    pub created_at: i64,
}

impl User {
    /// Snapshot of the user's connected integration credentials.
    pub fn credentials(&self) -> CredentialSet {
        CredentialSet {
            notion: self.notion_token.clone(),
            github: self.github_token.clone(),
            clockify: self.clockify_token.clone(),
        }
    }
}

/// Per-user collection of optional integration tokens.
///
/// An absent token means that integration is skipped, never an error.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    pub notion: Option<String>,
    pub github: Option<String>,
    pub clockify: Option<String>,
}

impl CredentialSet {
    /// Token for an integration by name, if connected.
    pub fn token_for(&self, integration: &str) -> Option<&str> {
        match integration {
            "notion" => self.notion.as_deref(),
            "github" => self.github.as_deref(),
            "clockify" => self.clockify.as_deref(),
            _ => None,
        }
    }

    /// Whether any integration is connected.
    pub fn is_empty(&self) -> bool {
        self.notion.is_none() && self.github.is_none() && self.clockify.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub key_prefix: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub last_used_at: Option<i64>,
    pub created_at: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Types (for creating entities)
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Input for storing a newly issued API token
#[derive(Debug, Clone)]
pub struct NewApiToken {
    pub user_id: String,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
}
