//! Current-user routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::middleware::AuthContext;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", get(current_user))
        .route("/logout", post(logout))
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub integrations: IntegrationStatus,
}

/// Which integrations the user has connected (tokens themselves stay server-side)
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationStatus {
    pub notion: bool,
    pub github: bool,
    pub clockify: bool,
}

/// Get the authenticated user
async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(UserResponse {
        id: user.id.clone(),
        email: user.email.clone(),
        integrations: IntegrationStatus {
            notion: user.notion_token.is_some(),
            github: user.github_token.is_some(),
            clockify: user.clockify_token.is_some(),
        },
    }))
}

/// Revoke the bearer token used for this request
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_api_token(&auth.token_id, &auth.user_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    state.tokens.remove(&auth.token_id).await;

    info!(user_id = %auth.user_id, "Revoked API token");
    Ok(StatusCode::NO_CONTENT)
}
