//! Authentication middleware for aar-server.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Authentication context extracted from request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub token_id: String,
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, code) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing authentication token",
                "MISSING_TOKEN",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid authentication token",
                "INVALID_TOKEN",
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Authentication middleware for axum
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get("Authorization")
        .ok_or(AuthError::MissingToken)?;

    let raw_key = header
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?
        .trim_start_matches("Bearer ")
        .trim();

    if raw_key.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let entry = state
        .tokens
        .validate(raw_key)
        .await
        .ok_or(AuthError::InvalidToken)?;

    // Last-used bookkeeping is best-effort
    let _ = state.db.touch_api_token(&entry.token_id);

    request.extensions_mut().insert(AuthContext {
        user_id: entry.user_id,
        token_id: entry.token_id,
    });

    Ok(next.run(request).await)
}
