/// Errors from a cache backend. Only ever surfaces on `set`/`delete` against
/// the networked backend — `get` treats a backend error the same as a miss
/// (spec §4.2 only gates *writes* on validation; reads degrade quietly).
#[derive(Debug)]
pub enum CacheError {
    Backend(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Backend(msg) => write!(f, "cache backend error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}
