use sqlx::SqlitePool;

use crate::entities::Source;
use crate::error::StoreError;

#[derive(Clone)]
pub struct SourceRepository {
    pool: SqlitePool,
}

impl SourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Source>, StoreError> {
        let row = sqlx::query_as::<_, Source>(
            "SELECT id, endpoint_id, name, base_url, priority, is_primary, active FROM sources WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Active sources for an endpoint, lowest priority integer first (spec
    /// §3 — "lower priority integer = earlier preference").
    pub async fn find_active_by_endpoint(&self, endpoint_id: i64) -> Result<Vec<Source>, StoreError> {
        let rows = sqlx::query_as::<_, Source>(
            "SELECT id, endpoint_id, name, base_url, priority, is_primary, active \
             FROM sources WHERE endpoint_id = ? AND active = 1 ORDER BY priority ASC, id ASC",
        )
        .bind(endpoint_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_all_by_endpoint(&self, endpoint_id: i64) -> Result<Vec<Source>, StoreError> {
        let rows = sqlx::query_as::<_, Source>(
            "SELECT id, endpoint_id, name, base_url, priority, is_primary, active \
             FROM sources WHERE endpoint_id = ? ORDER BY priority ASC, id ASC",
        )
        .bind(endpoint_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        &self,
        endpoint_id: i64,
        name: &str,
        base_url: &str,
        priority: i64,
        is_primary: bool,
        active: bool,
    ) -> Result<Source, StoreError> {
        let id = sqlx::query(
            "INSERT INTO sources (endpoint_id, name, base_url, priority, is_primary, active) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(endpoint_id)
        .bind(name)
        .bind(base_url)
        .bind(priority)
        .bind(is_primary)
        .bind(active)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| StoreError::Other("insert did not persist".into()))
    }

    pub async fn update(&self, source: &Source) -> Result<Source, StoreError> {
        let affected = sqlx::query(
            "UPDATE sources SET name = ?, base_url = ?, priority = ?, is_primary = ?, active = ? WHERE id = ?",
        )
        .bind(&source.name)
        .bind(&source.base_url)
        .bind(source.priority)
        .bind(source.is_primary)
        .bind(source.active)
        .bind(source.id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(format!("source {}", source.id)));
        }
        self.find_by_id(source.id).await?.ok_or_else(|| StoreError::Other("update did not persist".into()))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM sources WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
