use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::entities::{HealthStatus, SourceHealth};
use crate::error::StoreError;

/// Append-only health observation log (spec §3). Writes never mutate a
/// prior row; concurrent appends from many tasks are safe because each is
/// an independent `INSERT`.
#[derive(Clone)]
pub struct HealthLogRepository {
    pool: SqlitePool,
}

impl HealthLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        source_id: i64,
        status: HealthStatus,
        elapsed_ms: i64,
        error_text: Option<&str>,
        observed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO health_observations (source_id, status, elapsed_ms, error_text, observed_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(source_id)
        .bind(status.as_str())
        .bind(elapsed_ms)
        .bind(error_text)
        .bind(observed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Latest observation per active source belonging to `endpoint_id`,
    /// joined against the source inventory. Sources with no observation
    /// yet come back as `UNKNOWN` (spec §4.7 `get_health_status`).
    pub async fn latest_by_endpoint(&self, endpoint_id: i64) -> Result<Vec<SourceHealth>, StoreError> {
        let rows = sqlx::query(
            "SELECT s.id AS source_id, s.name AS source_name, s.endpoint_id AS endpoint_id, \
                    h.status AS status, h.elapsed_ms AS elapsed_ms, h.observed_at AS observed_at \
             FROM sources s \
             LEFT JOIN health_observations h ON h.id = ( \
                 SELECT id FROM health_observations WHERE source_id = s.id ORDER BY observed_at DESC LIMIT 1 \
             ) \
             WHERE s.endpoint_id = ? \
             ORDER BY s.priority ASC, s.id ASC",
        )
        .bind(endpoint_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let status: Option<String> = row.try_get("status")?;
            out.push(SourceHealth {
                source_id: row.try_get("source_id")?,
                source_name: row.try_get("source_name")?,
                endpoint_id: row.try_get("endpoint_id")?,
                status: status.as_deref().map(HealthStatus::parse).unwrap_or(HealthStatus::Unknown),
                elapsed_ms: row.try_get("elapsed_ms")?,
                observed_at: row.try_get("observed_at")?,
            });
        }
        Ok(out)
    }
}
