use std::time::Instant;

use ag_cache::Cache;
use ag_fetcher::Fetcher;
use ag_rate_limit::RateLimiter;
use ag_store::{NewRequestObservation, Store};

use crate::aggregator::aggregate;
use crate::bruteforce::run_bruteforce;
use crate::context::RequestContext;
use crate::cross_category::run_cross_category;
use crate::error::GatewayError;
use crate::fan_out::standard_fan_out;
use crate::params::{base_path, normalize_aliases, DETAIL_ALIASES, EPISODE_ALIASES};
use crate::response::OrchestratedResponse;

/// Endpoints resolved by the bruteforce race instead of the standard ladder
/// (spec §4.6's applicability list).
const BRUTEFORCE_ENDPOINTS: &[&str] = &["/api/v1/anime-detail", "/api/v1/episode-detail"];

/// Ties the whole request lifecycle together (spec §4.5 steps 1-8):
/// admission, cache lookup, source resolution, fan-out, logging, cache
/// write, and response metadata.
#[derive(Clone)]
pub struct Orchestrator {
    store: Store,
    cache: Cache,
    rate_limiter: std::sync::Arc<RateLimiter>,
    fetcher: Fetcher,
}

impl Orchestrator {
    pub fn new(store: Store, cache: Cache, rate_limiter: std::sync::Arc<RateLimiter>, fetcher: Fetcher) -> Self {
        Self { store, cache, rate_limiter, fetcher }
    }

    pub async fn process(&self, mut ctx: RequestContext) -> Result<OrchestratedResponse, GatewayError> {
        let started_at = Instant::now();

        if !self.rate_limiter.try_acquire() {
            return Err(GatewayError::RateLimited);
        }

        if BRUTEFORCE_ENDPOINTS.contains(&ctx.endpoint_path.as_str()) {
            let aliases = if ctx.endpoint_path == "/api/v1/anime-detail" { DETAIL_ALIASES } else { EPISODE_ALIASES };
            normalize_aliases(&mut ctx.params, aliases).map_err(GatewayError::MissingIdentifier)?;
        }

        let cache_key = self.cache.make_key(&ctx.category, &ctx.endpoint_path, &ctx.params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(OrchestratedResponse {
                bytes: cached,
                source: "cache".to_string(),
                from_cache: true,
                response_time: started_at.elapsed(),
                attempted_sources: Vec::new(),
                total_attempts: 0,
                synthetic_source_url: String::new(),
                fallback_used: false,
            });
        }

        if ctx.category == "all" {
            return self.process_cross_category(&ctx, &cache_key, started_at).await;
        }

        let endpoint = self.resolve_endpoint(&ctx).await?;
        let sources = self.store.sources.find_active_by_endpoint(endpoint.id).await.map_err(|_| GatewayError::NoSources)?;
        if sources.is_empty() {
            self.log_request(&ctx, Some(""), false, started_at.elapsed(), 404).await;
            return Err(GatewayError::NoSources);
        }

        let result = if BRUTEFORCE_ENDPOINTS.contains(&ctx.endpoint_path.as_str()) {
            self.run_bruteforce_path(&ctx, &sources, started_at).await
        } else {
            self.run_standard_path(&ctx, &sources, started_at).await
        };

        match &result {
            Ok(response) => {
                self.log_request(&ctx, Some(response.source.as_str()), response.fallback_used, response.response_time, 200).await;
                if response.source != "cache" {
                    let ttl = self.cache.ttl_for(&ctx.endpoint_path);
                    let _ = self.cache.set(&cache_key, response.bytes.clone(), ttl).await;
                }
            }
            Err(_) => {
                self.log_request(&ctx, Some(""), false, started_at.elapsed(), 500).await;
            }
        }
        result
    }

    async fn resolve_endpoint(&self, ctx: &RequestContext) -> Result<ag_store::Endpoint, GatewayError> {
        let category = self
            .store
            .categories
            .find_by_name(&ctx.category)
            .await
            .map_err(|_| GatewayError::NoSources)?
            .ok_or(GatewayError::NoSources)?;

        if let Some(endpoint) = self
            .store
            .endpoints
            .find_by_category_and_path(category.id, &ctx.endpoint_path)
            .await
            .map_err(|_| GatewayError::NoSources)?
        {
            return Ok(endpoint);
        }

        let Some(stripped) = base_path(&ctx.endpoint_path) else { return Err(GatewayError::NoSources) };
        self.store
            .endpoints
            .find_by_category_and_path(category.id, &stripped)
            .await
            .map_err(|_| GatewayError::NoSources)?
            .ok_or(GatewayError::NoSources)
    }

    async fn run_standard_path(
        &self,
        ctx: &RequestContext,
        sources: &[ag_store::Source],
        started_at: Instant,
    ) -> Result<OrchestratedResponse, GatewayError> {
        let successes = standard_fan_out(&self.fetcher, &self.store.mirrors, sources, &ctx.endpoint_path, &ctx.params).await;
        if successes.is_empty() {
            return Err(GatewayError::AllSourcesFailed(ctx.endpoint_path.clone()));
        }

        let attempted_sources: Vec<String> = successes.iter().map(|s| s.source_name.clone()).collect();
        let fallback_used = successes.iter().any(|s| s.used_mirror);

        if successes.len() == 1 {
            let success = &successes[0];
            return Ok(OrchestratedResponse {
                bytes: success.bytes.clone(),
                source: success.source_name.clone(),
                from_cache: false,
                response_time: started_at.elapsed(),
                attempted_sources,
                total_attempts: successes.len(),
                synthetic_source_url: success.synthetic_source_url.clone(),
                fallback_used,
            });
        }

        match aggregate(&ctx.endpoint_path, &successes) {
            Some(aggregated) => Ok(OrchestratedResponse {
                bytes: aggregated.bytes,
                source: "aggregated".to_string(),
                from_cache: false,
                response_time: started_at.elapsed(),
                attempted_sources: aggregated.sources,
                total_attempts: successes.len(),
                synthetic_source_url: successes[0].synthetic_source_url.clone(),
                fallback_used,
            }),
            None => {
                let success = &successes[0];
                Ok(OrchestratedResponse {
                    bytes: success.bytes.clone(),
                    source: success.source_name.clone(),
                    from_cache: false,
                    response_time: started_at.elapsed(),
                    attempted_sources,
                    total_attempts: successes.len(),
                    synthetic_source_url: success.synthetic_source_url.clone(),
                    fallback_used,
                })
            }
        }
    }

    async fn run_bruteforce_path(
        &self,
        ctx: &RequestContext,
        sources: &[ag_store::Source],
        started_at: Instant,
    ) -> Result<OrchestratedResponse, GatewayError> {
        let winner = run_bruteforce(&self.fetcher, &self.store.mirrors, sources, &ctx.endpoint_path, &ctx.params).await?;
        Ok(OrchestratedResponse {
            bytes: winner.bytes,
            source: winner.source_name,
            from_cache: false,
            response_time: started_at.elapsed(),
            attempted_sources: Vec::new(),
            total_attempts: 1,
            synthetic_source_url: winner.synthetic_source_url,
            fallback_used: winner.used_mirror,
        })
    }

    async fn process_cross_category(&self, ctx: &RequestContext, cache_key: &str, started_at: Instant) -> Result<OrchestratedResponse, GatewayError> {
        let result = run_cross_category(&self.store, &self.fetcher, &ctx.endpoint_path, &ctx.params).await?;
        self.log_request(ctx, Some("cross-category"), false, started_at.elapsed(), 200).await;

        let ttl = self.cache.ttl_for(&ctx.endpoint_path);
        let _ = self.cache.set(cache_key, result.bytes.clone(), ttl).await;

        Ok(OrchestratedResponse {
            bytes: result.bytes,
            source: "cross-category".to_string(),
            from_cache: false,
            response_time: started_at.elapsed(),
            attempted_sources: result.sources,
            total_attempts: result.categories.len(),
            synthetic_source_url: String::new(),
            fallback_used: false,
        })
    }

    async fn log_request(&self, ctx: &RequestContext, source_used: Option<&str>, fallback_used: bool, elapsed: std::time::Duration, status: u16) {
        let _ = self
            .store
            .request_log
            .record(NewRequestObservation {
                endpoint_path: &ctx.endpoint_path,
                category_name: &ctx.category,
                source_used,
                fallback_used,
                elapsed_ms: elapsed.as_millis() as i64,
                http_status: status as i64,
                client_addr: ctx.client_addr.as_deref(),
                user_agent: ctx.user_agent.as_deref(),
                observed_at: chrono::Utc::now(),
            })
            .await;
    }
}
