//! Runtime settings read from the process environment.

use anyhow::Context;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://youtube-clone.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_TRENDING_LIMIT: i64 = 20;
pub const DEFAULT_LOG_FILTER: &str = "youtube_clone_api=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub query_timeout: Duration,
    pub trending_limit: i64,
}

impl Settings {
    /// Reads settings from the environment. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let query_timeout_ms = parse_or(&lookup, "QUERY_TIMEOUT_MS", DEFAULT_QUERY_TIMEOUT_MS)?;
        let trending_limit = parse_or(&lookup, "TRENDING_LIMIT", DEFAULT_TRENDING_LIMIT)?;

        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        if trending_limit < 1 {
            anyhow::bail!("TRENDING_LIMIT must be at least 1");
        }

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            query_timeout: Duration::from_millis(query_timeout_ms),
            trending_limit,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
