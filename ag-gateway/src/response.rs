use std::time::Duration;

use bytes::Bytes;

/// The result of a single successful orchestrated request (spec §4.5 step
/// 8's "metadata enrichment").
#[derive(Debug, Clone)]
pub struct OrchestratedResponse {
    pub bytes: Bytes,
    /// Selected source name, `cache`, or an aggregation marker.
    pub source: String,
    pub from_cache: bool,
    pub response_time: Duration,
    pub attempted_sources: Vec<String>,
    pub total_attempts: usize,
    pub synthetic_source_url: String,
    pub fallback_used: bool,
}
