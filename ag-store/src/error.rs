/// Errors from the persistent store.
///
/// Mirrors the reference data layer's error shape (`NotFound` /
/// `Database` / `Other`) so it bridges into [`ag_core::AppError`] the same
/// way the reference's `DataError` bridges into its own HTTP error type.
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl StoreError {
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Database(Box::new(err))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "not found: {msg}"),
            StoreError::Database(err) => write!(f, "database error: {err}"),
            StoreError::Other(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".into()),
            other => StoreError::database(other),
        }
    }
}

impl From<StoreError> for ag_core::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ag_core::AppError::NotFound(msg),
            StoreError::Database(e) => ag_core::AppError::Internal(e.to_string()),
            StoreError::Other(msg) => ag_core::AppError::Internal(msg),
        }
    }
}
