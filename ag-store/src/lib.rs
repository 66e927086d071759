//! Persistent relational store (spec §3): categories, endpoints, sources,
//! fallback mirrors, and the two append-only logs. Read-mostly during
//! steady state; mutated only by the admin adapter and the health prober.

pub mod entities;
pub mod error;
pub mod pool;
pub mod repository;
pub mod source_map;

pub use entities::{Category, Endpoint, HealthObservation, HealthStatus, Mirror, RequestObservation, Source, SourceHealth};
pub use error::StoreError;
pub use pool::connect;
pub use repository::{
    CategoryRepository, EndpointRepository, HealthLogRepository, MirrorRepository, NewRequestObservation,
    RequestLogRepository, SourceRepository,
};
pub use source_map::{load as load_source_map, seed_priority, SourceDeclaration};

use sqlx::SqlitePool;

/// Handle bundling every repository over a shared pool. Constructed once at
/// startup and cloned into the orchestrator and the admin adapter alike.
#[derive(Clone)]
pub struct Store {
    pub categories: CategoryRepository,
    pub endpoints: EndpointRepository,
    pub sources: SourceRepository,
    pub mirrors: MirrorRepository,
    pub health_log: HealthLogRepository,
    pub request_log: RequestLogRepository,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            categories: CategoryRepository::new(pool.clone()),
            endpoints: EndpointRepository::new(pool.clone()),
            sources: SourceRepository::new(pool.clone()),
            mirrors: MirrorRepository::new(pool.clone()),
            health_log: HealthLogRepository::new(pool.clone()),
            request_log: RequestLogRepository::new(pool),
        }
    }

    /// Seeds the database from a loaded source map against every known
    /// endpoint of every category, assigning priorities with
    /// [`source_map::seed_priority`]. Only meaningful on an empty store
    /// (spec §6 — "On first startup with an empty config store").
    pub async fn seed_if_empty(&self, declarations: &[SourceDeclaration]) -> Result<(), StoreError> {
        if !self.categories.find_all().await?.is_empty() {
            return Ok(());
        }
        if declarations.is_empty() {
            return Ok(());
        }

        let category = self.categories.create("anime", true).await?;
        for path in KNOWN_ENDPOINT_PATHS {
            let endpoint = self.endpoints.create(category.id, path).await?;
            for decl in declarations {
                let priority = seed_priority(path, &decl.name);
                self.sources.create(endpoint.id, &decl.name, &decl.base_url, priority, true, true).await?;
            }
        }
        tracing::info!(sources = declarations.len(), endpoints = KNOWN_ENDPOINT_PATHS.len(), "store: seeded from source map");
        Ok(())
    }
}

/// Every literal endpoint path the seeding routine populates (spec §6's
/// default TTL table enumerates the same set).
const KNOWN_ENDPOINT_PATHS: &[&str] = &[
    "/api/v1/home",
    "/api/v1/jadwal-rilis",
    "/api/v1/anime-terbaru",
    "/api/v1/movie",
    "/api/v1/anime-detail",
    "/api/v1/episode-detail",
    "/api/v1/search",
];
