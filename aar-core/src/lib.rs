//! aar-core - Core library for AAR
//!
//! This crate provides shared functionality between the aar CLI and
//! aar-server:
//!
//! - **db**: SQLite user store (accounts, credentials, API tokens)
//! - **auth**: password hashing and opaque API keys
//! - **window**: the fixed activity lookback window
//! - **integrations**: upstream activity clients (Notion, GitHub, Clockify)
//! - **generator**: report text generation via a local model
//! - **cache**: TTL report cache
//! - **report**: the report orchestration service

pub mod auth;
pub mod cache;
pub mod db;
pub mod error;
pub mod generator;
pub mod integrations;
pub mod report;
pub mod window;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use report::ReportService;
