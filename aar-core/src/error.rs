//! Error types for aar-core.

use thiserror::Error;

/// Result type alias using aar-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for aar operations
#[derive(Error, Debug)]
pub enum Error {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    // Auth errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing authentication")]
    MissingAuth,

    // Report pipeline errors
    #[error("Integration fetch failed for {integration}: {reason}")]
    IntegrationFetch { integration: String, reason: String },

    #[error("Report generation failed: {0}")]
    Generation(String),

    #[error("Report cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Unknown integration: {0}")]
    UnknownIntegration(String),

    // Upstream HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an integration fetch error
    pub fn integration_fetch(integration: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IntegrationFetch {
            integration: integration.into(),
            reason: reason.into(),
        }
    }
}
