use axum::{
    routing::{get, post},
    Router,
};

use crate::api::v1::login::login_user;
use crate::api::v1::users::{all_users, register_user};
use crate::api::v1::videos::{all_videos, create_video, get_video, seed_videos, trending_videos};
use crate::system::route_not_found;
use crate::InnerState;

/// Catalog and account routes. A known path with the wrong method falls
/// through to the route-not-found payload.
#[tracing::instrument(name = "create_v1_routes", skip(state))]
pub fn create_v1_routes(state: InnerState) -> Router {
    tracing::info!("Setting up catalog and account routes");

    Router::new()
        // Catalog routes
        .route(
            "/api/videos",
            get(all_videos).post(create_video).fallback(route_not_found),
        )
        .route(
            "/api/videos/trending",
            get(trending_videos).fallback(route_not_found),
        )
        .route("/api/videos/:id", get(get_video).fallback(route_not_found))
        .route("/api/seed", post(seed_videos).fallback(route_not_found))

        // Account routes
        .route("/api/register", post(register_user).fallback(route_not_found))
        .route("/api/login", post(login_user).fallback(route_not_found))
        .route("/api/users", get(all_users).fallback(route_not_found))
        .with_state(state)
}
