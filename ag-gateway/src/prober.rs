//! Background health prober (spec §4.7). Runs on its own schedule,
//! independent of client traffic, and never influences fan-out ordering —
//! only the admin surface's health view reads its observations.

use std::sync::Arc;
use std::time::Duration;

use ag_fetcher::Fetcher;
use ag_scheduler::SchedulerHandle;
use ag_store::{HealthStatus, Source, SourceHealth, Store};
use tokio::sync::Semaphore;

/// Default period between probe sweeps (spec §4.7's default).
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on in-flight probes for a manual health check run.
const MANUAL_CHECK_CONCURRENCY: usize = 8;

/// Tally returned by a manual, synchronous health check run.
#[derive(Debug, Default)]
pub struct ProbeTally {
    pub ok: usize,
    pub timeout: usize,
    pub error: usize,
    pub total: usize,
}

/// One source's outcome from a manual health check run.
#[derive(Debug, Clone)]
pub struct ManualCheckResult {
    pub source_id: i64,
    pub source_name: String,
    pub endpoint_id: i64,
    pub status: HealthStatus,
    pub elapsed_ms: i64,
}

/// Aggregate tally across every source probed by a manual health check.
#[derive(Debug, Default)]
pub struct ManualCheckTally {
    pub checked: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub health_percentage: f64,
}

/// Full result of `run_manual_health_check` (spec §4.7): per-source status
/// plus the aggregate tally.
#[derive(Debug, Default)]
pub struct ManualCheckReport {
    pub results: Vec<ManualCheckResult>,
    pub tally: ManualCheckTally,
}

/// Start the periodic prober on `scheduler`. Stops when the scheduler is
/// cancelled.
pub fn start(scheduler: &SchedulerHandle, store: Store, fetcher: Fetcher, interval: Duration) {
    scheduler.spawn_interval("health-prober", interval, move || {
        let store = store.clone();
        let fetcher = fetcher.clone();
        async move {
            let _ = sweep(&store, &fetcher).await;
        }
    });
}

/// One sweep across every active source of every active category, writing
/// a health observation for each.
pub async fn sweep(store: &Store, fetcher: &Fetcher) -> ProbeTally {
    let mut tally = ProbeTally::default();

    let categories = store.categories.find_all().await.unwrap_or_default();
    for category in categories.iter().filter(|c| c.active) {
        let endpoints = store.endpoints.find_by_category(category.id).await.unwrap_or_default();
        for endpoint in endpoints {
            let sources = store.sources.find_active_by_endpoint(endpoint.id).await.unwrap_or_default();
            for source in sources {
                let outcome = probe_one(fetcher, &source, &endpoint.path).await;
                tally.total += 1;
                match outcome.0 {
                    HealthStatus::Ok => tally.ok += 1,
                    HealthStatus::Timeout => tally.timeout += 1,
                    HealthStatus::Error => tally.error += 1,
                    HealthStatus::Unknown => {}
                }
                let _ = store
                    .health_log
                    .record(source.id, outcome.0, outcome.1, outcome.2.as_deref(), chrono::Utc::now())
                    .await;
            }
        }
    }

    tally
}

/// Run a health check synchronously, fanning every source's probe out
/// under a bounded concurrency limit, and return per-source status plus
/// the aggregate tally (spec §4.7's `run_manual_health_check`).
pub async fn run_manual_health_check(store: &Store, fetcher: &Fetcher) -> ManualCheckReport {
    let mut targets = Vec::new();
    let categories = store.categories.find_all().await.unwrap_or_default();
    for category in categories.iter().filter(|c| c.active) {
        let endpoints = store.endpoints.find_by_category(category.id).await.unwrap_or_default();
        for endpoint in endpoints {
            let sources = store.sources.find_active_by_endpoint(endpoint.id).await.unwrap_or_default();
            for source in sources {
                targets.push((source, endpoint.id, endpoint.path.clone()));
            }
        }
    }

    let semaphore = Arc::new(Semaphore::new(MANUAL_CHECK_CONCURRENCY));
    let mut set = tokio::task::JoinSet::new();
    for (source, endpoint_id, endpoint_path) in targets {
        let fetcher = fetcher.clone();
        let store = store.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
            let (status, elapsed_ms, error) = probe_one(&fetcher, &source, &endpoint_path).await;
            let _ = store.health_log.record(source.id, status, elapsed_ms, error.as_deref(), chrono::Utc::now()).await;
            ManualCheckResult { source_id: source.id, source_name: source.name, endpoint_id, status, elapsed_ms }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        if let Ok(result) = joined {
            results.push(result);
        }
    }

    let checked = results.len();
    let healthy = results.iter().filter(|r| r.status == HealthStatus::Ok).count();
    let unhealthy = checked - healthy;
    let health_percentage = if checked == 0 { 0.0 } else { (healthy as f64 / checked as f64) * 100.0 };

    ManualCheckReport { results, tally: ManualCheckTally { checked, healthy, unhealthy, health_percentage } }
}

/// Read the most recently recorded status for every source on an endpoint
/// (spec §4.7's `get_health_status`).
pub async fn get_health_status(store: &Store, endpoint_id: i64) -> Vec<SourceHealth> {
    store.health_log.latest_by_endpoint(endpoint_id).await.unwrap_or_default()
}

/// One minimal probe GET per endpoint shape, classified into a health
/// status with elapsed milliseconds and an optional error string.
async fn probe_one(fetcher: &Fetcher, source: &Source, endpoint_path: &str) -> (HealthStatus, i64, Option<String>) {
    let probe_url = probe_url(&source.base_url, endpoint_path);
    let response = fetcher.fetch(&probe_url, &source.name, false).await;
    let elapsed_ms = response.elapsed.as_millis() as i64;

    // Liveness only cares about the status line; an empty 2xx body (a
    // failure for the client-facing fetch path) is still a healthy probe.
    if response.status.is_some_and(|status| (200..300).contains(&status)) {
        return (HealthStatus::Ok, elapsed_ms, None);
    }

    let error = response.error.unwrap_or_default();
    if error.to_lowercase().contains("timeout") {
        (HealthStatus::Timeout, elapsed_ms, Some(error))
    } else {
        (HealthStatus::Error, elapsed_ms, Some(error))
    }
}

/// Minimal query string for each endpoint shape, just enough to exercise
/// the upstream's happy path without fetching a real payload.
fn probe_url(base_url: &str, endpoint_path: &str) -> String {
    let query = match endpoint_path {
        "/api/v1/search" => "?query=a",
        "/api/v1/anime-detail" => "?id=1",
        "/api/v1/episode-detail" => "?id=1",
        _ => "",
    };
    format!("{}{}{}", base_url.trim_end_matches('/'), endpoint_path, query)
}
