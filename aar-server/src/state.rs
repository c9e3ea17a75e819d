//! Application state.

use aar_core::auth::hash_key;
use aar_core::db::ApiToken;
use aar_core::{Database, ReportService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::Config;

/// API token entry for validation
#[derive(Debug, Clone)]
pub struct TokenEntry {
    pub token_id: String,
    pub user_id: String,
    pub name: String,
}

/// In-memory API token registry, keyed by key hash.
///
/// Loaded from the database at startup and kept in sync as tokens are
/// issued and revoked, so request validation never touches the store.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, TokenEntry>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Validate a raw bearer key, returning the matching entry
    pub async fn validate(&self, raw_key: &str) -> Option<TokenEntry> {
        let tokens = self.tokens.read().await;
        tokens.get(&hash_key(raw_key)).cloned()
    }

    pub async fn add(&self, key_hash: String, entry: TokenEntry) {
        let mut tokens = self.tokens.write().await;
        tokens.insert(key_hash, entry);
    }

    pub async fn remove(&self, token_id: &str) {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, entry| entry.token_id != token_id);
    }

    /// Load tokens from database entries
    pub async fn load_from_db(&self, entries: Vec<ApiToken>) {
        let mut tokens = self.tokens.write().await;
        for token in entries {
            tokens.insert(
                token.key_hash,
                TokenEntry {
                    token_id: token.id,
                    user_id: token.user_id,
                    name: token.name,
                },
            );
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// User store
    pub db: Arc<Database>,
    /// Report orchestration service
    pub reports: Arc<ReportService>,
    /// API token registry
    pub tokens: Arc<TokenRegistry>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, db: Arc<Database>, reports: ReportService) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            db,
            reports: Arc::new(reports),
            tokens: Arc::new(TokenRegistry::new()),
            start_time: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aar_core::auth::issue_api_key;

    fn entry(token_id: &str, user_id: &str) -> TokenEntry {
        TokenEntry {
            token_id: token_id.to_string(),
            user_id: user_id.to_string(),
            name: format!("test-token-{token_id}"),
        }
    }

    #[tokio::test]
    async fn test_registry_starts_empty() {
        let registry = TokenRegistry::new();
        assert!(registry.validate("aar_anything").await.is_none());
    }

    #[tokio::test]
    async fn test_registry_add_and_validate() {
        let registry = TokenRegistry::new();
        let key = issue_api_key();

        registry.add(key.key_hash.clone(), entry("t-1", "u-1")).await;

        let found = registry.validate(&key.raw_key).await.unwrap();
        assert_eq!(found.token_id, "t-1");
        assert_eq!(found.user_id, "u-1");
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_key() {
        let registry = TokenRegistry::new();
        let key = issue_api_key();
        registry.add(key.key_hash, entry("t-1", "u-1")).await;

        let other = issue_api_key();
        assert!(registry.validate(&other.raw_key).await.is_none());
    }

    #[tokio::test]
    async fn test_registry_remove() {
        let registry = TokenRegistry::new();
        let key = issue_api_key();
        registry.add(key.key_hash.clone(), entry("t-1", "u-1")).await;

        assert!(registry.validate(&key.raw_key).await.is_some());

        registry.remove("t-1").await;

        assert!(registry.validate(&key.raw_key).await.is_none());
    }

    #[tokio::test]
    async fn test_registry_load_from_db() {
        let registry = TokenRegistry::new();
        let keys: Vec<_> = (0..3).map(|_| issue_api_key()).collect();

        let entries = keys
            .iter()
            .enumerate()
            .map(|(i, key)| ApiToken {
                id: format!("t-{i}"),
                user_id: "u-1".to_string(),
                name: format!("token-{i}"),
                key_prefix: key.key_prefix.clone(),
                key_hash: key.key_hash.clone(),
                last_used_at: None,
                created_at: 0,
            })
            .collect();

        registry.load_from_db(entries).await;

        for key in &keys {
            assert!(registry.validate(&key.raw_key).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_registry_multiple_tokens_same_user() {
        let registry = TokenRegistry::new();
        let a = issue_api_key();
        let b = issue_api_key();

        registry.add(a.key_hash.clone(), entry("t-1", "u-1")).await;
        registry.add(b.key_hash.clone(), entry("t-2", "u-1")).await;

        assert_eq!(registry.validate(&a.raw_key).await.unwrap().user_id, "u-1");
        assert_eq!(registry.validate(&b.raw_key).await.unwrap().user_id, "u-1");
    }
}
