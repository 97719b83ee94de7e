use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::services::accounts::{Registration, User};
use crate::InnerState;

#[tracing::instrument(name = "Register new user", skip(inner, payload))]
pub async fn register_user(
    State(inner): State<InnerState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(registration) = payload?;
    let registered = inner.accounts.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "userId": registered.user_id,
            "username": registered.username
        })),
    ))
}

#[tracing::instrument(name = "Get all users", skip(inner))]
pub async fn all_users(State(inner): State<InnerState>) -> Result<Json<Vec<User>>, AppError> {
    let users = inner.accounts.list_users().await?;
    tracing::info!("Returning {} users", users.len());
    Ok(Json(users))
}
