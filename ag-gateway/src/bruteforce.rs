use std::collections::BTreeMap;
use std::time::Duration;

use ag_fetcher::Fetcher;
use ag_store::{MirrorRepository, Source};
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::fan_out::mirror_tag;
use crate::url_builder::build_outbound_url;

/// Per-candidate budget multiplied by candidate count to form the overall
/// deadline (spec §4.6 — "2s × candidate count").
const PER_CANDIDATE_BUDGET: Duration = Duration::from_secs(2);

/// One candidate URL in the bruteforce race: either a source's primary
/// base or one of its fallback mirrors.
struct Candidate {
    source_name: String,
    url: String,
    synthetic_priority: i64,
    is_mirror: bool,
}

/// Winning candidate, validated.
pub struct BruteforceWinner {
    pub source_name: String,
    pub synthetic_source_url: String,
    pub bytes: Bytes,
    pub used_mirror: bool,
    pub synthetic_priority: i64,
}

async fn build_candidates(
    mirrors: &MirrorRepository,
    sources: &[Source],
    endpoint_path: &str,
    params: &BTreeMap<String, String>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for source in sources.iter().filter(|s| s.active) {
        candidates.push(Candidate {
            source_name: source.name.clone(),
            url: build_outbound_url(&source.base_url, endpoint_path, params),
            synthetic_priority: source.priority,
            is_mirror: false,
        });

        let fallback_mirrors = mirrors.find_active_by_source(source.id).await.unwrap_or_default();
        for (idx, mirror) in fallback_mirrors.iter().enumerate() {
            candidates.push(Candidate {
                source_name: mirror_tag(&source.name, idx),
                url: build_outbound_url(&mirror.mirror_url, endpoint_path, params),
                synthetic_priority: source.priority + 1000 + idx as i64,
                is_mirror: true,
            });
        }
    }

    candidates
}

/// Race every primary-and-mirror candidate for a detail endpoint (spec
/// §4.6). The first validated response wins outright; stragglers keep
/// running to completion in the background but are no longer consulted.
/// If nothing validates before the deadline, the lowest-synthetic-priority
/// candidate among whatever did validate by then wins instead.
pub async fn run_bruteforce(
    fetcher: &Fetcher,
    mirrors: &MirrorRepository,
    sources: &[Source],
    endpoint_path: &str,
    params: &BTreeMap<String, String>,
) -> Result<BruteforceWinner, GatewayError> {
    let candidates = build_candidates(mirrors, sources, endpoint_path, params).await;
    if candidates.is_empty() {
        return Err(GatewayError::NoSources);
    }

    let deadline = PER_CANDIDATE_BUDGET * candidates.len() as u32;
    let (tx, mut rx) = mpsc::unbounded_channel::<BruteforceWinner>();

    for candidate in candidates {
        let fetcher = fetcher.clone();
        let tx = tx.clone();
        let endpoint_path = endpoint_path.to_string();
        tokio::spawn(async move {
            let response = fetcher.fetch(&candidate.url, &candidate.source_name, candidate.is_mirror).await;
            if !response.is_success() {
                return;
            }
            let Some(bytes) = response.bytes else { return };
            if ag_validator::validate(&endpoint_path, &bytes).is_err() {
                return;
            }
            let _ = tx.send(BruteforceWinner {
                source_name: candidate.source_name,
                synthetic_source_url: candidate.url,
                bytes,
                used_mirror: candidate.is_mirror,
                synthetic_priority: candidate.synthetic_priority,
            });
        });
    }
    drop(tx);

    match tokio::time::timeout(deadline, rx.recv()).await {
        Ok(Some(winner)) => Ok(winner),
        _ => {
            let mut late_arrivals = Vec::new();
            while let Ok(winner) = rx.try_recv() {
                late_arrivals.push(winner);
            }
            late_arrivals.sort_by_key(|w| w.synthetic_priority);
            late_arrivals.into_iter().next().ok_or_else(|| GatewayError::AllSourcesFailed(endpoint_path.to_string()))
        }
    }
}
