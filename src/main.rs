mod api;
mod authentication;
mod config;
mod db;
mod errors;
mod services;
mod system;

use anyhow::Context;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use sqlx::SqlitePool;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::api::create_api_router;
use crate::config::{Settings, DEFAULT_LOG_FILTER};
use crate::db::init_db;
use crate::services::{AccountService, CatalogService};

/// Shared by every handler. Both accessors hold clones of the same pool.
#[derive(Clone)]
pub struct InnerState {
    pub db: SqlitePool,
    pub catalog: CatalogService,
    pub accounts: AccountService,
}

impl InnerState {
    pub fn new(db: SqlitePool, settings: &Settings) -> Self {
        Self {
            catalog: CatalogService::new(
                db.clone(),
                settings.query_timeout,
                settings.trending_limit,
            ),
            accounts: AccountService::new(db.clone(), settings.query_timeout),
            db,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let db = init_db(&settings).await?;

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app_state = InnerState::new(db.clone(), &settings);

    let app = create_api_router(app_state)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(settings.bind_address())
        .await
        .with_context(|| format!("Could not bind to {}", settings.bind_address()))?;

    tracing::info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    db.close().await;
    tracing::info!("Database connection closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
pub(crate) async fn test_state() -> InnerState {
    let settings = Settings::from_lookup(|_| None).expect("default settings are valid");
    InnerState::new(db::init_test_db().await, &settings)
}
