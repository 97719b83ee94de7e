//! Custom tracing callbacks for the HTTP trace layer
//!
//! Builds one span per request and logs request/response pairs with the
//! level picked from the response status class.

use axum::body::Body;
use axum::http::{HeaderMap, Request, Response};
use std::collections::HashMap;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tracing::{info_span, Span};

pub fn make_custom_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri().path(),
        query = ?request.uri().query(),
        request_id = request_id,
        user_agent = ?request.headers().get("user-agent"),
        content_length = ?request.headers().get("content-length"),
    )
}

pub fn on_custom_request(request: &Request<Body>, _span: &Span) {
    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        headers = ?redacted_headers(request.headers()),
        "Incoming HTTP request"
    );
}

pub fn on_custom_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis();

    match status.as_u16() {
        400..=499 => tracing::warn!(
            status = %status,
            latency_ms = latency_ms,
            "HTTP request completed with client error"
        ),
        500..=599 => tracing::error!(
            status = %status,
            latency_ms = latency_ms,
            "HTTP request completed with server error"
        ),
        _ => tracing::info!(
            status = %status,
            latency_ms = latency_ms,
            "HTTP request completed successfully"
        ),
    }
}

pub fn on_custom_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    let error_type = match &error {
        ServerErrorsFailureClass::StatusCode(code) => format!("HTTP {}", code.as_u16()),
        ServerErrorsFailureClass::Error(_) => "Internal Error".to_string(),
    };

    tracing::error!(
        error = ?error,
        latency_ms = latency.as_millis(),
        error_type = error_type,
        "HTTP request failed"
    );
}

/// Header map safe to log: credentials are replaced with a marker.
pub fn redacted_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let lowered = name.as_str().to_lowercase();
            if lowered.contains("authorization")
                || lowered.contains("cookie")
                || lowered.contains("token")
            {
                Some((name.to_string(), "[REDACTED]".to_string()))
            } else {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect()
}
