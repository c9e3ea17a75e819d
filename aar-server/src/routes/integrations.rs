//! Integration connection routes.

use aar_core::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::middleware::AuthContext;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/connect/{integration}", post(connect))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectResponse {
    pub integration: String,
    pub connected: bool,
}

/// Store a credential token for one integration
async fn connect(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(integration): Path<String>,
    Json(input): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, (StatusCode, String)> {
    if input.token.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Token is required".to_string()));
    }

    state
        .db
        .set_integration_token(&auth.user_id, &integration, &input.token)
        .map_err(|e| match e {
            Error::UnknownIntegration(name) => (
                StatusCode::NOT_FOUND,
                format!("Unknown integration: {name}"),
            ),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })?;

    info!(user_id = %auth.user_id, integration = %integration, "Connected integration");

    Ok(Json(ConnectResponse {
        integration,
        connected: true,
    }))
}
