//! Minimal health-indicator trait, used by `ag-api`'s `GET /health` liveness
//! route. Trimmed from the reference framework's `HealthIndicator` — this
//! gateway's own liveness notion (spec §6: `GET /health`) doesn't need the
//! readiness/caching machinery the framework offers for larger services.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down(String),
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }
}

/// A named liveness check (e.g. "database", "cache").
pub trait HealthIndicator: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn check(&self) -> impl std::future::Future<Output = HealthStatus> + Send;
}
