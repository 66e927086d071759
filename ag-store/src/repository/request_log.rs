use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StoreError;

/// Append-only request observation log. The orchestrator writes exactly one
/// row per call to `process`, success or failure (spec §4.4 step 6, and the
/// "Single request log per request" invariant).
#[derive(Clone)]
pub struct RequestLogRepository {
    pool: SqlitePool,
}

pub struct NewRequestObservation<'a> {
    pub endpoint_path: &'a str,
    pub category_name: &'a str,
    pub source_used: Option<&'a str>,
    pub fallback_used: bool,
    pub elapsed_ms: i64,
    pub http_status: i64,
    pub client_addr: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub observed_at: DateTime<Utc>,
}

impl RequestLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, obs: NewRequestObservation<'_>) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO request_observations \
             (endpoint_path, category_name, source_used, fallback_used, elapsed_ms, http_status, client_addr, user_agent, observed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(obs.endpoint_path)
        .bind(obs.category_name)
        .bind(obs.source_used)
        .bind(obs.fallback_used)
        .bind(obs.elapsed_ms)
        .bind(obs.http_status)
        .bind(obs.client_addr)
        .bind(obs.user_agent)
        .bind(obs.observed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
