//! Keyed blob cache for validated upstream responses (spec §4.2).
//!
//! [`Cache`] is the capability applications hold: a backend chosen once at
//! startup (networked preferred, in-process fallback), plus per-endpoint TTL
//! lookup and key construction. The backend choice is never a per-call
//! branch, per spec §9's "Cache abstraction" design note.

pub mod error;
pub mod key;
pub mod store;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

pub use error::CacheError;
pub use key::{make_key, INTERNAL_PARAMS};
pub use store::{CacheStore, InProcessStore, NetworkedStore};

const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Per-endpoint TTL overrides (spec §6's default table). Endpoints not
/// listed fall back to `DEFAULT_TTL`.
fn default_ttl_for(endpoint: &str) -> Duration {
    match endpoint {
        "/api/v1/home" => Duration::from_secs(15 * 60),
        "/api/v1/jadwal-rilis" => Duration::from_secs(30 * 60),
        "/api/v1/anime-terbaru" => Duration::from_secs(15 * 60),
        "/api/v1/movie" => Duration::from_secs(60 * 60),
        "/api/v1/anime-detail" => Duration::from_secs(60 * 60),
        "/api/v1/episode-detail" => Duration::from_secs(30 * 60),
        "/api/v1/search" => Duration::from_secs(10 * 60),
        _ => DEFAULT_TTL,
    }
}

/// Cache capability handed to the orchestrator.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheStore>,
    is_networked: bool,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheStore>, is_networked: bool) -> Self {
        Self { backend, is_networked }
    }

    /// Prefer the networked backend; fall back to the in-process map if its
    /// liveness check fails. Logged either way (spec §4.2).
    pub async fn connect(addr: &str, db_index: u64) -> Self {
        match NetworkedStore::new(addr, db_index) {
            Ok(store) => match store.ping().await {
                Ok(()) => {
                    tracing::info!(addr, "cache: using networked backend");
                    return Self::new(Arc::new(store), true);
                }
                Err(err) => {
                    tracing::warn!(addr, %err, "cache: networked backend unreachable, falling back to in-process map");
                }
            },
            Err(err) => {
                tracing::warn!(addr, %err, "cache: failed to build networked client, falling back to in-process map");
            }
        }
        Self::new(Arc::new(InProcessStore::new()), false)
    }

    pub fn is_networked(&self) -> bool {
        self.is_networked
    }

    pub fn ttl_for(&self, endpoint: &str) -> Duration {
        default_ttl_for(endpoint)
    }

    pub fn make_key(&self, category: &str, endpoint: &str, params: &BTreeMap<String, String>) -> String {
        make_key(category, endpoint, params)
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.backend.get(key).await
    }

    pub async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_match_spec_table() {
        assert_eq!(default_ttl_for("/api/v1/movie"), Duration::from_secs(3600));
        assert_eq!(default_ttl_for("/api/v1/search"), Duration::from_secs(600));
        assert_eq!(default_ttl_for("/api/v1/unknown"), DEFAULT_TTL);
    }

    #[tokio::test]
    async fn cache_round_trips_through_in_process_backend() {
        let cache = Cache::new(Arc::new(InProcessStore::new()), false);
        let key = cache.make_key("anime", "/api/v1/search", &BTreeMap::new());
        assert!(cache.get(&key).await.is_none());
        cache.set(&key, Bytes::from("payload"), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(&key).await, Some(Bytes::from("payload")));
    }
}
