use ag_fetcher::Fetcher;
use ag_gateway::Orchestrator;
use ag_scheduler::SharedScheduler;
use ag_store::Store;

/// Shared application state handed to every axum handler (grounded on the
/// reference framework's generated bean-holder state struct, trimmed to a
/// plain `Clone` struct now that routes are hand-wired).
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub store: Store,
    pub scheduler: SharedScheduler,
    pub fetcher: Fetcher,
}
