use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::services::accounts::Credentials;
use crate::InnerState;

#[tracing::instrument(name = "User login", skip(inner, payload))]
pub async fn login_user(
    State(inner): State<InnerState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(credentials) = payload?;
    let user = inner.accounts.authenticate(credentials).await?;

    tracing::info!("Login completed successfully for user: {}", user.user_id);
    Ok(Json(json!({
        "message": "Login successful",
        "userId": user.user_id,
        "username": user.username,
        "email": user.email
    })))
}
