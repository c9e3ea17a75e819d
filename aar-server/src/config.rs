//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Database path
    pub database_path: PathBuf,
    /// Log file path
    pub log_file: PathBuf,
    /// Ollama base URL for report generation
    pub ollama_url: String,
    /// Model name passed to the generator
    pub model: String,
    /// Report cache time-to-live
    pub report_ttl: Duration,
    /// Per-integration fetch deadline
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let aar_dir = home.join(".aar");

        Self {
            bind_addr: ([127, 0, 0, 1], 8000).into(),
            database_path: aar_dir.join("sqlite.db"),
            log_file: aar_dir.join("server.log"),
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            report_ttl: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment overrides and defaults
    ///
    /// Standard directory structure:
    /// ```text
    /// ~/.aar/
    /// ├── sqlite.db    # User store
    /// └── server.log   # Logs
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        // Use AAR_DIR env var if set, otherwise ~/.aar
        let aar_dir = std::env::var("AAR_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".aar"));

        std::fs::create_dir_all(&aar_dir)?;

        let bind_addr = match std::env::var("AAR_BIND_ADDR") {
            Ok(raw) => raw.parse()?,
            Err(_) => ([127, 0, 0, 1], 8000).into(),
        };

        let ollama_url = std::env::var("AAR_OLLAMA_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let model = std::env::var("AAR_MODEL").unwrap_or_else(|_| "llama3".to_string());

        let report_ttl = match std::env::var("AAR_REPORT_TTL_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse()?),
            Err(_) => Duration::from_secs(3600),
        };

        Ok(Self {
            bind_addr,
            database_path: aar_dir.join("sqlite.db"),
            log_file: aar_dir.join("server.log"),
            ollama_url,
            model,
            report_ttl,
            fetch_timeout: Duration::from_secs(30),
        })
    }
}
