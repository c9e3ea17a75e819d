//! Authentication primitives for aar.
//!
//! Two credential kinds:
//! - Passwords: stored as salted, iterated SHA-256 digests.
//! - API keys: random 256-bit bearer keys. The raw key is shown once at
//!   login; only its SHA-256 hash is stored and compared afterwards.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Display prefix length taken from the raw key
const PREFIX_LEN: usize = 8;

/// Iteration count for password digests
const PASSWORD_ROUNDS: u32 = 100_000;

// ─────────────────────────────────────────────────────────────────────────────
// Passwords
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a random 16-byte salt as hex
pub fn generate_salt() -> String {
    let mut salt = [0u8; 16];
    for byte in &mut salt {
        *byte = rand::random();
    }
    hex::encode(salt)
}

/// Hash a password with the given salt (iterated SHA-256, hex output)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();

    for _ in 1..PASSWORD_ROUNDS {
        digest = Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(digest)
            .finalize();
    }

    hex::encode(digest)
}

/// Verify a password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

// ─────────────────────────────────────────────────────────────────────────────
// API Keys
// ─────────────────────────────────────────────────────────────────────────────

/// A freshly issued API key.
///
/// `raw_key` leaves the process exactly once, in the login response.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    /// Bearer key handed to the client
    pub raw_key: String,
    /// Short display prefix for listings
    pub key_prefix: String,
    /// SHA-256 hex digest stored server-side
    pub key_hash: String,
}

/// Generate a new random API key
pub fn issue_api_key() -> IssuedKey {
    let mut key = [0u8; 32];
    for byte in &mut key {
        *byte = rand::random();
    }

    let raw_key = format!("aar_{}", STANDARD.encode(key));
    let key_prefix = raw_key[..4 + PREFIX_LEN].to_string();
    let key_hash = hash_key(&raw_key);

    IssuedKey {
        raw_key,
        key_prefix,
        key_hash,
    }
}

/// Hash a raw API key using SHA-256 and return as hex
pub fn hash_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}
