//! Periodic task runner (spec §4.7 — "the health prober runs on its own
//! periodic scheduler"). A trimmed version of the reference framework's
//! interval task machinery: no cron expressions, no dependency-injection
//! plugin wiring, since the gateway has exactly one scheduled job.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Handle to a running scheduler: cancel it to stop every job it owns.
#[derive(Clone)]
pub struct SchedulerHandle {
    cancel: CancellationToken,
}

impl SchedulerHandle {
    pub fn new() -> Self {
        Self { cancel: CancellationToken::new() }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Spawn `job` to run every `interval`, stopping when this handle is
    /// cancelled. The first run happens after the first tick (one interval
    /// after start), matching `tokio::time::interval`'s default behavior.
    pub fn spawn_interval<F, Fut>(&self, name: &'static str, interval: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!(job = name, "scheduler: job cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        job().await;
                    }
                }
            }
        });
    }
}

impl Default for SchedulerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle, cloned into whichever component needs to observe or
/// cancel the scheduler (the admin adapter's shutdown hook, in this
/// gateway's case).
pub type SharedScheduler = Arc<SchedulerHandle>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn job_runs_once_per_interval_until_cancelled() {
        let scheduler = SchedulerHandle::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        scheduler.spawn_interval("test", Duration::from_secs(1), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        scheduler.cancel();
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
