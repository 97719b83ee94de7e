//! Account accessor: registration, credential checks and the user listing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::api::common::utils::{non_blank, query_timeout_error, timeout_query};
use crate::authentication::{compute_password_hash, verify_credentials};
use crate::errors::{AppError, INVALID_CREDENTIALS};

const USER_EXISTS: &str = "User already exists";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredUser {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

fn non_blank_secret(value: Option<SecretString>) -> Option<SecretString> {
    value.filter(|secret| !secret.expose_secret().is_empty())
}

#[derive(Clone, Debug)]
pub struct AccountService {
    db: SqlitePool,
    query_timeout: Duration,
}

impl AccountService {
    pub fn new(db: SqlitePool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    #[tracing::instrument(name = "Register user", skip(self, registration), fields(username = ?registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<RegisteredUser, AppError> {
        let (Some(username), Some(email), Some(password)) = (
            non_blank(registration.username),
            non_blank(registration.email),
            non_blank_secret(registration.password),
        ) else {
            return Err(AppError::Validation("All fields are required".to_string()));
        };

        let existing = timeout_query(
            self.query_timeout,
            sqlx::query_scalar::<_, String>(
                r#"SELECT id FROM users WHERE email = ? OR username = ? LIMIT 1"#,
            )
            .bind(&email)
            .bind(&username)
            .fetch_optional(&self.db),
        )
        .await?;

        if existing.is_some() {
            tracing::warn!("Registration rejected, username or email taken: {}", username);
            return Err(AppError::Conflict(USER_EXISTS.to_string()));
        }

        let password_hash = compute_password_hash(password).await?;
        let user_id = Uuid::new_v4().to_string();

        let inserted = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                r#"INSERT INTO users (id, username, email, password_hash, created_at)
                VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(&user_id)
            .bind(&username)
            .bind(&email)
            .bind(&password_hash)
            .bind(Utc::now())
            .execute(&self.db),
        )
        .await
        .map_err(|_| query_timeout_error(self.query_timeout))?;

        match inserted {
            Ok(_) => {
                tracing::info!("Registered user {} with ID: {}", username, user_id);
                Ok(RegisteredUser { user_id, username })
            }
            // A concurrent registration claimed the name between the check and the insert.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::warn!("Registration lost a race on a unique key: {}", db_err);
                Err(AppError::Conflict(USER_EXISTS.to_string()))
            }
            Err(e) => Err(AppError::Database(
                anyhow::Error::new(e).context("Failed to create user"),
            )),
        }
    }

    /// Unknown email and wrong password fail identically.
    #[tracing::instrument(name = "Authenticate user", skip(self, credentials), fields(email = ?credentials.email))]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<AuthenticatedUser, AppError> {
        let (Some(email), Some(password)) = (
            non_blank(credentials.email),
            non_blank_secret(credentials.password),
        ) else {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        };

        let user = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = ?"#)
                .bind(&email)
                .fetch_optional(&self.db),
        )
        .await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        verify_credentials(stored_hash, password).await?;

        let user = user.ok_or_else(|| AppError::Authentication(anyhow::anyhow!(INVALID_CREDENTIALS)))?;
        tracing::info!("User {} authenticated", user.id);

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    #[tracing::instrument(name = "List users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, User>(r#"SELECT * FROM users ORDER BY created_at ASC, id ASC"#)
                .fetch_all(&self.db),
        )
        .await
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users"#).fetch_one(&self.db),
        )
        .await
    }
}
