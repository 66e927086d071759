use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::StoreError;

/// Open the store's database, creating the file if necessary, and run
/// pending migrations.
pub async fn connect(database_path: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true);

    // A single physical in-memory database only exists per-connection, so a
    // pool of more than one connection would each see an empty database.
    // Tests use `:memory:` and rely on this to share state.
    let max_connections = if database_path == ":memory:" { 1 } else { 10 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| StoreError::Other(e.to_string()))?;

    tracing::info!(database_path, "store: migrations applied");
    Ok(pool)
}
