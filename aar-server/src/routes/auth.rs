//! Registration and login routes.

use aar_core::auth::{generate_salt, hash_password, issue_api_key, verify_password};
use aar_core::db::{NewApiToken, NewUser};
use aar_core::Error;
use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::state::{AppState, TokenEntry};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Optional label for the issued token (e.g. a hostname)
    pub token_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Register a new user account
async fn register(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), (StatusCode, String)> {
    if input.email.is_empty() || input.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required".to_string(),
        ));
    }

    let salt = generate_salt();
    let user = NewUser {
        email: input.email.clone(),
        password_hash: hash_password(&input.password, &salt),
        password_salt: salt,
    };

    let id = state.db.create_user(&user).map_err(|e| match e {
        Error::EmailTaken(_) => (
            StatusCode::BAD_REQUEST,
            "Email already registered".to_string(),
        ),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    info!(user_id = %id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            email: input.email,
        }),
    ))
}

/// Log in with email and password, issuing a bearer token
async fn login(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let user = state
        .db
        .get_user_by_email(&input.email)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let user = match user {
        Some(u) if verify_password(&input.password, &u.password_salt, &u.password_hash) => u,
        // Same response for unknown email and wrong password
        _ => {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
            ))
        }
    };

    let key = issue_api_key();
    let token_name = input.token_name.unwrap_or_else(|| "login".to_string());

    let token_id = state
        .db
        .create_api_token(&NewApiToken {
            user_id: user.id.clone(),
            name: token_name.clone(),
            key_prefix: key.key_prefix.clone(),
            key_hash: key.key_hash.clone(),
        })
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    // Register for immediate validation
    state
        .tokens
        .add(
            key.key_hash,
            TokenEntry {
                token_id,
                user_id: user.id.clone(),
                name: token_name,
            },
        )
        .await;

    info!(user_id = %user.id, prefix = %key.key_prefix, "Issued API token");

    Ok(Json(LoginResponse {
        access_token: key.raw_key,
        token_type: "bearer".to_string(),
    }))
}
