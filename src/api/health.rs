//! Database health-check endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::probe::ProbeOutcome;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct DbHealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /db-health
///
/// Runs a connection probe against the configured database. Callers only
/// ever see one of two fixed bodies; error detail stays in the log.
pub async fn db_health(State(state): State<AppState>) -> (StatusCode, Json<DbHealthResponse>) {
    match state.prober.probe().await {
        ProbeOutcome::Connected => (
            StatusCode::OK,
            Json(DbHealthResponse {
                status: "ok",
                message: "Database connection successful",
            }),
        ),
        ProbeOutcome::Failed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DbHealthResponse {
                status: "error",
                message: "Database connection failed after retries.",
            }),
        ),
    }
}
