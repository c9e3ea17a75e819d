//! Report generation route.

use aar_core::Error;
use axum::{extract::State, http::StatusCode, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::middleware::AuthContext;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/report", get(generate_report))
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub report: String,
}

/// Generate (or serve from cache) the weekly after-action report
async fn generate_report(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReportResponse>, (StatusCode, String)> {
    let report = state
        .reports
        .generate_report(&auth.user_id)
        .await
        .map_err(|e| match e {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
            Error::Generation(reason) => (
                StatusCode::BAD_GATEWAY,
                format!("Report generation failed: {reason}"),
            ),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })?;

    Ok(Json(ReportResponse { report }))
}
