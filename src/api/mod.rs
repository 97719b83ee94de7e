//! HTTP surface of the service
//!
//! Merges the system routes with the catalog/account routes and wraps
//! them with CORS and request tracing.

pub mod common;
pub mod v1;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::common::tracing::{
    make_custom_span, on_custom_failure, on_custom_request, on_custom_response,
};
use crate::system::{create_system_router, route_not_found};
use crate::InnerState;

/// Creates the main API router
#[tracing::instrument(name = "create_api_router", skip(state))]
pub fn create_api_router(state: InnerState) -> Router {
    tracing::info!("Creating API router");

    Router::new()
        .merge(create_system_router(state.clone()))
        .merge(v1::routes::create_v1_routes(state))
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_custom_span)
                .on_request(on_custom_request)
                .on_response(on_custom_response)
                .on_failure(on_custom_failure),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn app() -> Router {
        create_api_router(test_state().await)
    }

    fn sample_video(title: &str) -> Value {
        json!({
            "title": title,
            "thumbnail": "https://img.youtube.com/vi/abc/maxresdefault.jpg",
            "channel": "Fireship",
            "duration": "12:30"
        })
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn create_then_fetch_increments_views() {
        let app = app().await;

        let (status, created) =
            send(&app, Method::POST, "/api/videos", Some(sample_video("Intro"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["views"], 0);
        assert_eq!(created["category"], "general");
        assert!(created["uploadDate"].is_string());

        let id = created["id"].as_str().unwrap();
        let (status, fetched) = send(&app, Method::GET, &format!("/api/videos/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["views"], 1);
        assert_eq!(fetched["title"], "Intro");
        assert_eq!(fetched["videoUrl"], "");
    }

    #[tokio::test]
    async fn create_with_missing_title_is_rejected() {
        let app = app().await;
        let mut video = sample_video("ignored");
        video.as_object_mut().unwrap().remove("title");

        let (status, body) = send(&app, Method::POST, "/api/videos", Some(video)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Video validation failed");
        assert!(body["errors"]["title"].is_array());

        let (_, videos) = send(&app, Method::GET, "/api/videos", None).await;
        assert_eq!(videos.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn oversized_counter_is_rejected() {
        let app = app().await;
        let mut video = sample_video("big");
        video["views"] = json!(i64::MAX);

        let (status, body) = send(&app, Method::POST, "/api/videos", Some(video)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["views"].is_array());

        let (status, videos) = send(&app, Method::GET, "/api/videos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(videos.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/videos")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_video_is_not_found() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/videos/000000000000000000000000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Video not found");

        let (_, diagnostics) = send(&app, Method::GET, "/api/test-db", None).await;
        assert_eq!(diagnostics["videos"], 0);
    }

    #[tokio::test]
    async fn seed_then_trending_returns_top_by_views() {
        let app = app().await;

        let (status, body) = send(&app, Method::POST, "/api/seed", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Database seeded successfully");
        assert_eq!(body["count"], 37);

        let (status, trending) = send(&app, Method::GET, "/api/videos/trending", None).await;
        assert_eq!(status, StatusCode::OK);
        let trending = trending.as_array().unwrap();
        assert_eq!(trending.len(), 20);
        assert_eq!(trending[0]["title"], "Taylor Swift - Anti-Hero (Official Music Video)");
        assert!(trending
            .windows(2)
            .all(|w| w[0]["views"].as_i64() >= w[1]["views"].as_i64()));

        let (_, limited) = send(&app, Method::GET, "/api/videos/trending?limit=3", None).await;
        assert_eq!(limited.as_array().unwrap().len(), 3);

        let (status, _) = send(&app, Method::GET, "/api/videos/trending?limit=lots", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, all) = send(&app, Method::GET, "/api/videos", None).await;
        assert_eq!(all.as_array().unwrap().len(), 37);
    }

    #[tokio::test]
    async fn register_and_login_flow() {
        let app = app().await;

        let (status, registered) = send(
            &app,
            Method::POST,
            "/api/register",
            Some(json!({ "username": "ana", "email": "a@x.com", "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(registered["message"], "User registered successfully");
        assert_eq!(registered["username"], "ana");
        let user_id = registered["userId"].as_str().unwrap().to_string();

        let (status, conflict) = send(
            &app,
            Method::POST,
            "/api/register",
            Some(json!({ "username": "ana2", "email": "a@x.com", "password": "p2" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(conflict["message"], "User already exists");

        let (status, wrong) = send(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, unknown) = send(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({ "email": "nobody@x.com", "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong["message"], unknown["message"]);
        assert_eq!(wrong["message"], "Invalid email or password");

        let (status, login) = send(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({ "email": "a@x.com", "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["message"], "Login successful");
        assert_eq!(login["userId"], user_id.as_str());
        assert_eq!(login["email"], "a@x.com");
        assert!(login.get("password").is_none());

        let (status, users) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(status, StatusCode::OK);
        let users = users.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].get("password").is_none());
        assert!(users[0].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn missing_credentials_are_bad_requests() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/register",
            Some(json!({ "username": "ana", "email": "a@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All fields are required");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email and password are required");
    }

    #[tokio::test]
    async fn diagnostics_report_counts() {
        let app = app().await;
        send(&app, Method::POST, "/api/seed", None).await;

        let (status, body) = send(&app, Method::GET, "/api/test-db", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Database connected");
        assert_eq!(body["videos"], 37);
        assert_eq!(body["users"], 0);
    }

    #[tokio::test]
    async fn unmatched_routes_list_available_routes() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/nope?x=1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["url"], "/api/nope?x=1");
        assert!(body["availableRoutes"]
            .as_array()
            .unwrap()
            .contains(&json!("POST /api/login")));

        let (status, body) = send(&app, Method::DELETE, "/api/videos", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["method"], "DELETE");
    }
}
