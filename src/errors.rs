use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error as StdError;

use crate::authentication::AuthError;

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(#[source] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict error: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Validation errors")]
    ValidationErrors(String, HashMap<String, Vec<String>>),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Duplicate registrations are reported as a plain bad request.
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::JsonBody(_)
            | AppError::ValidationErrors(..) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_message, errors) = match &self {
            AppError::Authentication(e) => (format!("{}", e), None),
            AppError::Database(e) => (format!("Database error: {}", e), None),
            AppError::Validation(msg) => (msg.clone(), None),
            AppError::Conflict(msg) => (msg.clone(), None),
            AppError::NotFound(msg) => (msg.clone(), None),
            AppError::JsonBody(rejection) => (rejection.body_text(), None),
            AppError::Unexpected(e) => (format!("An unexpected error occurred: {}", e), None),
            AppError::ValidationErrors(msg, validation_errors) => {
                (msg.clone(), Some(validation_errors.clone()))
            }
        };

        if status.is_server_error() {
            tracing::error!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request rejected"
            );
        }

        // For unexpected errors, log the source chain if available for more detailed debugging
        if let AppError::Unexpected(e) | AppError::Database(e) = &self {
            let mut source_chain = String::new();
            let mut current_err: Option<&(dyn StdError + 'static)> = e.source();
            while let Some(err) = current_err {
                source_chain.push_str(&format!("\n  Caused by: {}", err));
                current_err = err.source();
            }
            if !source_chain.is_empty() {
                tracing::error!("Error source chain:{}", source_chain);
            }
        }

        let body = match errors {
            Some(validation_errors) => Json(json!({
                "message": error_message,
                "status": status.as_u16(),
                "errors": validation_errors
            })),
            None => Json(json!({
                "message": error_message,
                "status": status.as_u16()
            })),
        };
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            _ => AppError::Database(anyhow::Error::new(err).context("SQLx operation failed")),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials(source) => {
                // The cause stays in the logs; clients only ever see the generic message.
                tracing::debug!("Rejected credentials: {:?}", source);
                AppError::Authentication(anyhow::anyhow!(INVALID_CREDENTIALS))
            }
            AuthError::UnexpectedError(e) => AppError::Unexpected(e),
        }
    }
}
