use axum::{routing::get, Router};

use crate::server::AppState;

use super::health::db_health;

pub fn api_routes() -> Router<AppState> {
    Router::new().route("/db-health", get(db_health))
}
