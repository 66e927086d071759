use sqlx::SqlitePool;

use crate::entities::Mirror;
use crate::error::StoreError;

#[derive(Clone)]
pub struct MirrorRepository {
    pool: SqlitePool,
}

impl MirrorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active mirrors for a source, ordered by priority (spec §3 — "ordered
    /// by priority").
    pub async fn find_active_by_source(&self, source_id: i64) -> Result<Vec<Mirror>, StoreError> {
        let rows = sqlx::query_as::<_, Mirror>(
            "SELECT id, source_id, mirror_url, priority, active \
             FROM mirrors WHERE source_id = ? AND active = 1 ORDER BY priority ASC, id ASC",
        )
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, source_id: i64, mirror_url: &str, priority: i64, active: bool) -> Result<Mirror, StoreError> {
        let id = sqlx::query("INSERT INTO mirrors (source_id, mirror_url, priority, active) VALUES (?, ?, ?, ?)")
            .bind(source_id)
            .bind(mirror_url)
            .bind(priority)
            .bind(active)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        sqlx::query_as::<_, Mirror>("SELECT id, source_id, mirror_url, priority, active FROM mirrors WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM mirrors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
