//! Video catalog accessor
//!
//! Owns the `videos` table: recency and popularity listings, fetch with
//! view counting, creation and the sample-data reseed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::api::common::utils::{timeout_query, FieldErrors};
use crate::errors::AppError;

const SAMPLE_VIDEOS: &str = include_str!("sample_videos.json");
const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel: String,
    pub views: i64,
    pub upload_date: DateTime<Utc>,
    pub duration: String,
    pub description: String,
    pub likes: i64,
    pub dislikes: i64,
    pub category: String,
    pub video_url: String,
}

/// Client-supplied video fields; everything is optional until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<String>,
    pub views: Option<i64>,
    pub upload_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub likes: Option<i64>,
    pub dislikes: Option<i64>,
    pub category: Option<String>,
    pub video_url: Option<String>,
}

impl NewVideo {
    /// Validates required fields and counters, filling defaults for the rest.
    /// `upload_date` falls back to `now` when the client did not send one.
    pub fn into_video(self, now: DateTime<Utc>) -> Result<Video, AppError> {
        let mut errors = FieldErrors::default();

        let title = errors.require("title", self.title);
        let thumbnail = errors.require("thumbnail", self.thumbnail);
        let channel = errors.require("channel", self.channel);
        let duration = errors.require("duration", self.duration);
        let views = errors.counter("views", self.views);
        let likes = errors.counter("likes", self.likes);
        let dislikes = errors.counter("dislikes", self.dislikes);

        errors.into_result("Video validation failed")?;

        Ok(Video {
            id: Uuid::new_v4().to_string(),
            title,
            thumbnail,
            channel,
            views,
            upload_date: self.upload_date.unwrap_or(now),
            duration,
            description: self.description.unwrap_or_default(),
            likes,
            dislikes,
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            video_url: self.video_url.unwrap_or_default(),
        })
    }
}

/// The fixed sample catalog, in publication order (newest first).
pub fn sample_videos() -> Result<Vec<NewVideo>, AppError> {
    serde_json::from_str(SAMPLE_VIDEOS)
        .map_err(|e| AppError::Unexpected(anyhow::Error::new(e).context("Invalid sample catalog")))
}

#[derive(Clone, Debug)]
pub struct CatalogService {
    db: SqlitePool,
    query_timeout: Duration,
    trending_limit: i64,
}

impl CatalogService {
    pub fn new(db: SqlitePool, query_timeout: Duration, trending_limit: i64) -> Self {
        Self {
            db,
            query_timeout,
            trending_limit,
        }
    }

    pub fn default_trending_limit(&self) -> i64 {
        self.trending_limit
    }

    #[tracing::instrument(name = "List recent videos", skip(self))]
    pub async fn list_recent(&self) -> Result<Vec<Video>, AppError> {
        let videos = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, Video>(
                r#"SELECT * FROM videos ORDER BY upload_date DESC, id ASC"#,
            )
            .fetch_all(&self.db),
        )
        .await?;

        tracing::debug!("Fetched {} videos", videos.len());
        Ok(videos)
    }

    /// Most viewed first; equal view counts are ordered by id.
    #[tracing::instrument(name = "List trending videos", skip(self))]
    pub async fn list_trending(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.max(0);

        let videos = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, Video>(
                r#"SELECT * FROM videos ORDER BY views DESC, id ASC LIMIT ?"#,
            )
            .bind(limit)
            .fetch_all(&self.db),
        )
        .await?;

        tracing::debug!("Fetched {} trending videos", videos.len());
        Ok(videos)
    }

    /// Returns the video after counting this fetch as one view.
    #[tracing::instrument(name = "Get video by id", skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Video, AppError> {
        let video = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, Video>(
                // Saturates so an overflow never turns the column into a REAL.
                r#"UPDATE videos
                SET views = CASE WHEN views < 9223372036854775807 THEN views + 1 ELSE views END
                WHERE id = ?
                RETURNING *"#,
            )
            .bind(id)
            .fetch_optional(&self.db),
        )
        .await?;

        match video {
            Some(video) => {
                tracing::debug!("Video {} now has {} views", video.id, video.views);
                Ok(video)
            }
            None => {
                tracing::warn!("Video {} not found", id);
                Err(AppError::NotFound("Video not found".to_string()))
            }
        }
    }

    #[tracing::instrument(name = "Create video", skip(self, new_video))]
    pub async fn create(&self, new_video: NewVideo) -> Result<Video, AppError> {
        let video = new_video.into_video(Utc::now())?;

        let created = timeout_query(self.query_timeout, async {
            let mut conn = self.db.acquire().await?;
            insert_video(&mut conn, &video).await
        })
        .await?;

        tracing::info!("Created video '{}' with ID: {}", created.title, created.id);
        Ok(created)
    }

    /// Replaces the whole catalog with the sample set in one transaction.
    #[tracing::instrument(name = "Reseed catalog", skip(self))]
    pub async fn reseed(&self) -> Result<usize, AppError> {
        let now = Utc::now();
        let videos = sample_videos()?
            .into_iter()
            .enumerate()
            .map(|(position, mut sample)| {
                // One hour apart so the recency listing follows the sample order.
                sample.upload_date = Some(now - chrono::Duration::hours(position as i64));
                sample.into_video(now)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inserted = timeout_query(self.query_timeout, async {
            let mut transaction = self.db.begin().await?;

            let deleted = sqlx::query(r#"DELETE FROM videos"#)
                .execute(&mut *transaction)
                .await?
                .rows_affected();
            tracing::debug!("Removed {} existing videos", deleted);

            for video in &videos {
                insert_video(&mut transaction, video).await?;
            }

            transaction.commit().await?;
            Ok::<_, sqlx::Error>(videos.len())
        })
        .await?;

        tracing::info!("Catalog reseeded with {} videos", inserted);
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM videos"#).fetch_one(&self.db),
        )
        .await
    }
}

async fn insert_video(conn: &mut SqliteConnection, video: &Video) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"INSERT INTO videos
            (id, title, thumbnail, channel, views, upload_date, duration,
             description, likes, dislikes, category, video_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *"#,
    )
    .bind(&video.id)
    .bind(&video.title)
    .bind(&video.thumbnail)
    .bind(&video.channel)
    .bind(video.views)
    .bind(video.upload_date)
    .bind(&video.duration)
    .bind(&video.description)
    .bind(video.likes)
    .bind(video.dislikes)
    .bind(&video.category)
    .bind(&video.video_url)
    .fetch_one(&mut *conn)
    .await
}
