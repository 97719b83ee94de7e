use std::collections::HashMap;
use std::time::Duration;

use crate::errors::AppError;

pub async fn timeout_query<T, F>(duration: Duration, fut: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(AppError::from(e)),
        Err(_) => Err(query_timeout_error(duration)),
    }
}

pub fn query_timeout_error(duration: Duration) -> AppError {
    AppError::Database(anyhow::anyhow!("Query timeout after {:?}", duration))
}

/// Largest counter accepted on input. Leaves room for at least one increment.
pub const MAX_COUNTER: i64 = i64::MAX - 1;

/// Returns the value when it has visible content.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Per-field validation messages, in the shape `AppError::ValidationErrors` reports.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, reason: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(reason.to_string());
    }

    /// Takes a required text field, recording an error when it is missing or blank.
    pub fn require(&mut self, field: &str, value: Option<String>) -> String {
        match non_blank(value) {
            Some(v) => v,
            None => {
                self.add(field, "is required");
                String::new()
            }
        }
    }

    /// Takes an optional counter, recording an error when it is negative or above `MAX_COUNTER`.
    pub fn counter(&mut self, field: &str, value: Option<i64>) -> i64 {
        match value {
            Some(v) if v < 0 => {
                self.add(field, "must not be negative");
                0
            }
            Some(v) if v > MAX_COUNTER => {
                self.add(field, "is too large");
                0
            }
            Some(v) => v,
            None => 0,
        }
    }

    pub fn into_result(self, message: &str) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationErrors(message.to_string(), self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_treated_as_missing() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" ana ".into())), Some(" ana ".into()));
    }

    #[test]
    fn field_errors_collect_every_failure() {
        let mut errors = FieldErrors::default();
        errors.require("title", None);
        errors.require("channel", Some("".into()));
        errors.counter("likes", Some(-1));
        let err = errors.into_result("Video validation failed").unwrap_err();
        match err {
            AppError::ValidationErrors(msg, fields) => {
                assert_eq!(msg, "Video validation failed");
                assert_eq!(fields.len(), 3);
                assert_eq!(fields["likes"], vec!["must not be negative".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn counters_are_bounded_on_both_sides() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.counter("views", Some(MAX_COUNTER)), MAX_COUNTER);
        assert_eq!(errors.counter("likes", None), 0);
        assert!(errors.0.is_empty());

        errors.counter("views", Some(i64::MAX));
        assert_eq!(errors.0["views"], vec!["is too large".to_string()]);
    }

    #[tokio::test]
    async fn slow_queries_time_out_as_database_errors() {
        let err = timeout_query(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
