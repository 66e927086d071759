use sqlx::SqlitePool;

use crate::entities::Endpoint;
use crate::error::StoreError;

#[derive(Clone)]
pub struct EndpointRepository {
    pool: SqlitePool,
}

impl EndpointRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Endpoint>, StoreError> {
        let row = sqlx::query_as::<_, Endpoint>("SELECT id, category_id, path FROM endpoints WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_category(&self, category_id: i64) -> Result<Vec<Endpoint>, StoreError> {
        let rows = sqlx::query_as::<_, Endpoint>("SELECT id, category_id, path FROM endpoints WHERE category_id = ? ORDER BY id")
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Looks up by the literal routed path. Callers strip any trailing
    /// variable segment themselves before retrying (spec §3
    /// "Parameterized endpoint resolution").
    pub async fn find_by_category_and_path(&self, category_id: i64, path: &str) -> Result<Option<Endpoint>, StoreError> {
        let row = sqlx::query_as::<_, Endpoint>(
            "SELECT id, category_id, path FROM endpoints WHERE category_id = ? AND path = ?",
        )
        .bind(category_id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, category_id: i64, path: &str) -> Result<Endpoint, StoreError> {
        let id = sqlx::query("INSERT INTO endpoints (category_id, path) VALUES (?, ?)")
            .bind(category_id)
            .bind(path)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| StoreError::Other("insert did not persist".into()))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM endpoints WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
