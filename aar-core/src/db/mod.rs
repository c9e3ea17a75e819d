//! SQLite user store for aar.
//!
//! Holds user accounts, their integration credentials, and issued API
//! tokens. The generated report text is never persisted here; it lives in
//! the TTL cache only.

pub mod types;

pub use types::*;

use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const USER_COLUMNS: &str = "id, email, password_hash, password_salt,
        notion_token, github_token, clockify_token, created_at";

const TOKEN_COLUMNS: &str =
    "id, user_id, name, key_prefix, key_hash, last_used_at, created_at";

/// Database connection wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::Database)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::Database)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create tables if they do not exist yet
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user (
                 id             TEXT PRIMARY KEY,
                 email          TEXT NOT NULL UNIQUE,
                 password_hash  TEXT NOT NULL,
                 password_salt  TEXT NOT NULL,
                 notion_token   TEXT,
                 github_token   TEXT,
                 clockify_token TEXT,
                 created_at     INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS api_token (
                 id           TEXT PRIMARY KEY,
                 user_id      TEXT NOT NULL REFERENCES user(id),
                 name         TEXT NOT NULL,
                 key_prefix   TEXT NOT NULL,
                 key_hash     TEXT NOT NULL UNIQUE,
                 last_used_at INTEGER,
                 created_at   INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_api_token_user ON api_token(user_id);",
        )?;
        Ok(())
    }

    /// Check database connectivity
    pub fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute_batch("SELECT 1").map_err(Error::Database)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new user, failing if the email is already registered
    pub fn create_user(&self, user: &NewUser) -> Result<String> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp_millis();

        let result = conn.execute(
            "INSERT INTO user (id, email, password_hash, password_salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user.email, user.password_hash, user.password_salt, now],
        );

        match result {
            Ok(_) => Ok(id),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::EmailTaken(user.email.clone()))
            }
            Err(e) => Err(Error::Database(e)),
        }
    }

    /// Get user by ID
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?1"))?;

        Ok(stmt.query_row(params![user_id], Self::map_user).optional()?)
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?1"))?;

        Ok(stmt.query_row(params![email], Self::map_user).optional()?)
    }

    /// Store (or replace) an integration credential for a user
    pub fn set_integration_token(
        &self,
        user_id: &str,
        integration: &str,
        token: &str,
    ) -> Result<()> {
        let column = match integration {
            "notion" => "notion_token",
            "github" => "github_token",
            "clockify" => "clockify_token",
            other => return Err(Error::UnknownIntegration(other.to_string())),
        };

        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let updated = conn.execute(
            &format!("UPDATE user SET {column} = ?1 WHERE id = ?2"),
            params![token, user_id],
        )?;

        if updated == 0 {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn map_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            password_salt: row.get(3)?,
            notion_token: row.get(4)?,
            github_token: row.get(5)?,
            clockify_token: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Token Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a newly issued API token (hash only, never the raw key)
    pub fn create_api_token(&self, token: &NewApiToken) -> Result<String> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO api_token (id, user_id, name, key_prefix, key_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                token.user_id,
                token.name,
                token.key_prefix,
                token.key_hash,
                now,
            ],
        )?;

        Ok(id)
    }

    /// List all API tokens for a user
    pub fn list_api_tokens(&self, user_id: &str) -> Result<Vec<ApiToken>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_token WHERE user_id = ?1 ORDER BY created_at"
        ))?;

        let tokens = stmt
            .query_map(params![user_id], Self::map_api_token)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tokens)
    }

    /// Load every stored token (registry warm-up at server startup)
    pub fn list_all_api_tokens(&self) -> Result<Vec<ApiToken>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(&format!("SELECT {TOKEN_COLUMNS} FROM api_token"))?;

        let tokens = stmt
            .query_map([], Self::map_api_token)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tokens)
    }

    /// Delete an API token owned by a user, returning whether it existed
    pub fn delete_api_token(&self, token_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let deleted = conn.execute(
            "DELETE FROM api_token WHERE id = ?1 AND user_id = ?2",
            params![token_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Record token use
    pub fn touch_api_token(&self, token_id: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let now = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "UPDATE api_token SET last_used_at = ?1 WHERE id = ?2",
            params![now, token_id],
        )?;
        Ok(())
    }

    fn map_api_token(row: &rusqlite::Row) -> rusqlite::Result<ApiToken> {
        Ok(ApiToken {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            key_prefix: row.get(3)?,
            key_hash: row.get(4)?,
            last_used_at: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db
    }

    fn test_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            password_salt: "salt".to_string(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let db = test_db();
        let id = db.create_user(&test_user("a@example.com")).unwrap();

        let user = db.get_user(&id).unwrap().unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.password_hash, "hash");
        // New users start with no integrations connected
        assert!(user.credentials().is_empty());
    }

    #[test]
    fn test_get_user_by_email() {
        let db = test_db();
        db.create_user(&test_user("a@example.com")).unwrap();

        assert!(db.get_user_by_email("a@example.com").unwrap().is_some());
        assert!(db.get_user_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = test_db();
        db.create_user(&test_user("a@example.com")).unwrap();

        let err = db.create_user(&test_user("a@example.com")).unwrap_err();
        assert!(matches!(err, Error::EmailTaken(_)));
    }

    #[test]
    fn test_set_integration_token() {
        let db = test_db();
        let id = db.create_user(&test_user("a@example.com")).unwrap();

        db.set_integration_token(&id, "notion", "secret_n").unwrap();
        db.set_integration_token(&id, "clockify", "secret_c").unwrap();

        let creds = db.get_user(&id).unwrap().unwrap().credentials();
        assert_eq!(creds.token_for("notion"), Some("secret_n"));
        assert_eq!(creds.token_for("clockify"), Some("secret_c"));
        assert_eq!(creds.token_for("github"), None);
    }

    #[test]
    fn test_set_integration_token_overwrites() {
        let db = test_db();
        let id = db.create_user(&test_user("a@example.com")).unwrap();

        db.set_integration_token(&id, "github", "old").unwrap();
        db.set_integration_token(&id, "github", "new").unwrap();

        let user = db.get_user(&id).unwrap().unwrap();
        assert_eq!(user.github_token.as_deref(), Some("new"));
    }

    #[test]
    fn test_set_integration_token_unknown_integration() {
        let db = test_db();
        let id = db.create_user(&test_user("a@example.com")).unwrap();

        let err = db.set_integration_token(&id, "jira", "t").unwrap_err();
        assert!(matches!(err, Error::UnknownIntegration(_)));
    }

    #[test]
    fn test_set_integration_token_unknown_user() {
        let db = test_db();
        let err = db
            .set_integration_token("missing", "notion", "t")
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn test_api_token_lifecycle() {
        let db = test_db();
        let user_id = db.create_user(&test_user("a@example.com")).unwrap();

        let token_id = db
            .create_api_token(&NewApiToken {
                user_id: user_id.clone(),
                name: "laptop".to_string(),
                key_prefix: "aar_abcd1234".to_string(),
                key_hash: "deadbeef".to_string(),
            })
            .unwrap();

        let tokens = db.list_api_tokens(&user_id).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "laptop");
        assert!(tokens[0].last_used_at.is_none());

        db.touch_api_token(&token_id).unwrap();
        let tokens = db.list_api_tokens(&user_id).unwrap();
        assert!(tokens[0].last_used_at.is_some());

        assert!(db.delete_api_token(&token_id, &user_id).unwrap());
        assert!(db.list_api_tokens(&user_id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_api_token_wrong_user() {
        let db = test_db();
        let user_id = db.create_user(&test_user("a@example.com")).unwrap();
        let token_id = db
            .create_api_token(&NewApiToken {
                user_id: user_id.clone(),
                name: "t".to_string(),
                key_prefix: "aar_x".to_string(),
                key_hash: "h1".to_string(),
            })
            .unwrap();

        // A different user cannot revoke the token
        assert!(!db.delete_api_token(&token_id, "someone-else").unwrap());
        assert_eq!(db.list_api_tokens(&user_id).unwrap().len(), 1);
    }

    #[test]
    fn test_list_all_api_tokens() {
        let db = test_db();
        let a = db.create_user(&test_user("a@example.com")).unwrap();
        let b = db.create_user(&test_user("b@example.com")).unwrap();

        for (user, hash) in [(&a, "h1"), (&a, "h2"), (&b, "h3")] {
            db.create_api_token(&NewApiToken {
                user_id: user.clone(),
                name: "t".to_string(),
                key_prefix: "aar_x".to_string(),
                key_hash: hash.to_string(),
            })
            .unwrap();
        }

        assert_eq!(db.list_all_api_tokens().unwrap().len(), 3);
    }

    #[test]
    fn test_schema_init_idempotent() {
        let db = test_db();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
        db.ping().unwrap();
    }
}
