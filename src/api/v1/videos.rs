use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::services::catalog::{NewVideo, Video};
use crate::InnerState;

const MAX_TRENDING_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<i64>,
}

#[tracing::instrument(name = "Get all videos", skip(inner))]
pub async fn all_videos(State(inner): State<InnerState>) -> Result<Json<Vec<Video>>, AppError> {
    let videos = inner.catalog.list_recent().await?;
    tracing::info!("Returning {} videos", videos.len());
    Ok(Json(videos))
}

#[tracing::instrument(name = "Get trending videos", skip(inner, params))]
pub async fn trending_videos(
    State(inner): State<InnerState>,
    params: Result<Query<TrendingParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, AppError> {
    let Query(params) =
        params.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let limit = params
        .limit
        .unwrap_or_else(|| inner.catalog.default_trending_limit())
        .clamp(1, MAX_TRENDING_LIMIT);

    let videos = inner.catalog.list_trending(limit).await?;
    tracing::info!("Returning {} trending videos (limit {})", videos.len(), limit);
    Ok(Json(videos))
}

#[tracing::instrument(name = "Get video by id", skip(inner), fields(video_id = %video_id))]
pub async fn get_video(
    State(inner): State<InnerState>,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, AppError> {
    let video = inner.catalog.get_by_id(&video_id).await?;
    Ok(Json(video))
}

#[tracing::instrument(name = "Create video", skip(inner, payload))]
pub async fn create_video(
    State(inner): State<InnerState>,
    payload: Result<Json<NewVideo>, JsonRejection>,
) -> Result<(StatusCode, Json<Video>), AppError> {
    let Json(new_video) = payload?;
    let video = inner.catalog.create(new_video).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

#[tracing::instrument(name = "Seed sample videos", skip(inner))]
pub async fn seed_videos(State(inner): State<InnerState>) -> Result<Json<Value>, AppError> {
    let count = inner.catalog.reseed().await?;
    Ok(Json(json!({
        "message": "Database seeded successfully",
        "count": count
    })))
}
