use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::InnerState;

/// Document counts plus pool state; any store failure is reported as
/// `{ message: "Database error", error }`.
#[tracing::instrument(name = "Database diagnostics", skip(inner))]
pub async fn test_db(State(inner): State<InnerState>) -> (StatusCode, Json<Value>) {
    match collect_counts(&inner).await {
        Ok((users, videos)) => (
            StatusCode::OK,
            Json(json!({
                "message": "Database connected",
                "users": users,
                "videos": videos,
                "pool": {
                    "size": inner.db.size(),
                    "idle": inner.db.num_idle(),
                    "closed": inner.db.is_closed()
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Database diagnostics failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Database error",
                    "error": e.to_string()
                })),
            )
        }
    }
}

async fn collect_counts(inner: &InnerState) -> Result<(i64, i64), AppError> {
    let users = inner.accounts.count().await?;
    let videos = inner.catalog.count().await?;
    Ok((users, videos))
}
