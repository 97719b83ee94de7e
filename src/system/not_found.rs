use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use crate::system::AVAILABLE_ROUTES;

pub async fn route_not_found(
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<Value>) {
    tracing::warn!("404 - Route not found: {} {}", method, uri);

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "method": method.as_str(),
            "url": uri.to_string(),
            "availableRoutes": AVAILABLE_ROUTES
        })),
    )
}
