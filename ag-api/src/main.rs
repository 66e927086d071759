use std::sync::Arc;

use ag_api::routes;
use ag_api::state::AppState;
use ag_cache::Cache;
use ag_core::{Config, GatewayConfig};
use ag_fetcher::Fetcher;
use ag_gateway::{prober, Orchestrator};
use ag_rate_limit::RateLimiter;
use ag_scheduler::SchedulerHandle;
use ag_store::Store;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ag_core::logging::init();

    let config = Config::from_env();
    let gateway_config = GatewayConfig::load(&config)?;

    let pool = ag_store::connect(&gateway_config.database_path).await?;
    let store = Store::new(pool);

    let declarations = ag_store::load_source_map(&config);
    store.seed_if_empty(&declarations).await?;

    let cache = Cache::connect(&gateway_config.cache_addr, gateway_config.cache_db_index).await;
    let rate_limiter = Arc::new(RateLimiter::new(gateway_config.rate_limit, gateway_config.rate_limit_window));
    let fetcher = Fetcher::new(gateway_config.request_timeout);

    let orchestrator = Orchestrator::new(store.clone(), cache, rate_limiter, fetcher.clone());

    let scheduler = Arc::new(SchedulerHandle::new());
    prober::start(&scheduler, store.clone(), fetcher.clone(), gateway_config.health_check_interval);

    let app_state = AppState { orchestrator, store, scheduler, fetcher };

    let app = routes::router()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!("http_request", method = %request.method(), path = %request.uri().path())
        }));

    let addr = format!("0.0.0.0:{}", gateway_config.listen_port);
    info!(addr, "aggregation gateway starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>()).await?;

    Ok(())
}
