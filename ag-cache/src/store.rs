use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::error::CacheError;

/// Pluggable cache backend.
///
/// Only responses that passed validation may ever be written here (that
/// invariant is enforced by the orchestrator, not this trait) — this trait
/// is a dumb blob store with per-key TTL.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Option<Bytes>;
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process fallback, backed by `DashMap`. Entries carry their own TTL and
/// are evicted lazily on read, matching the reference framework's
/// `InMemoryStore`.
#[derive(Clone, Default)]
pub struct InProcessStore {
    inner: Arc<DashMap<String, (Bytes, Instant, Duration)>>,
}

impl InProcessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InProcessStore {
    async fn get(&self, key: &str) -> Option<Bytes> {
        if let Some(entry) = self.inner.get(key) {
            let (val, inserted, ttl) = entry.value();
            if inserted.elapsed() < *ttl {
                return Some(val.clone());
            }
            drop(entry);
            self.inner.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), (value, Instant::now(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.remove(key);
        Ok(())
    }
}

/// Networked backend, preferred at startup when reachable (spec §4.2).
pub struct NetworkedStore {
    client: redis::Client,
}

impl NetworkedStore {
    /// Build a client for `addr` (host:port) against logical database
    /// `db_index`. Does not connect yet — call `ping` to check liveness.
    pub fn new(addr: &str, db_index: u64) -> Result<Self, CacheError> {
        let url = format!("redis://{addr}/{db_index}");
        let client = redis::Client::open(url).map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(Self { client })
    }

    /// Startup liveness probe — used once to decide whether to keep this
    /// backend or silently degrade to `InProcessStore` (spec §4.2).
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[async_trait]
impl CacheStore for NetworkedStore {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let mut conn = self.conn().await.ok()?;
        let raw: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .ok()?;
        raw.map(Bytes::from)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let secs = ttl.as_secs().max(1);
        redis::cmd("SET")
            .arg(key)
            .arg(value.as_ref())
            .arg("EX")
            .arg(secs)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
