//! System-level routes: banner, health, diagnostics and the not-found fallback

pub mod diagnostics;
pub mod health_check;
pub mod not_found;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::InnerState;

pub use not_found::route_not_found;

pub const AVAILABLE_ROUTES: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /api/test-db",
    "GET /api/videos",
    "GET /api/videos/trending",
    "GET /api/videos/:id",
    "POST /api/videos",
    "POST /api/seed",
    "POST /api/register",
    "POST /api/login",
    "GET /api/users",
];

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "YouTube Clone API",
        "status": "running",
        "endpoints": AVAILABLE_ROUTES
    }))
}

#[tracing::instrument(name = "create_system_router", skip(state))]
pub fn create_system_router(state: InnerState) -> Router {
    tracing::info!("Creating system router");

    Router::new()
        .route("/", get(root).fallback(route_not_found))
        .route("/health", get(health_check::health_check).fallback(route_not_found))
        .route("/api/test-db", get(diagnostics::test_db).fallback(route_not_found))
        .with_state(state)
}
