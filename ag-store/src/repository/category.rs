use sqlx::SqlitePool;

use crate::entities::Category;
use crate::error::StoreError;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name, active FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name, active FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name, active FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn create(&self, name: &str, active: bool) -> Result<Category, StoreError> {
        let id = sqlx::query("INSERT INTO categories (name, active) VALUES (?, ?)")
            .bind(name)
            .bind(active)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| StoreError::Other("insert did not persist".into()))
    }

    pub async fn update(&self, id: i64, name: &str, active: bool) -> Result<Category, StoreError> {
        let affected = sqlx::query("UPDATE categories SET name = ?, active = ? WHERE id = ?")
            .bind(name)
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(format!("category {id}")));
        }
        self.find_by_id(id).await?.ok_or_else(|| StoreError::Other("update did not persist".into()))
    }

    /// Deletion cascades to endpoints and their sources (spec §3 lifecycle,
    /// enforced by `ON DELETE CASCADE` in the schema).
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
