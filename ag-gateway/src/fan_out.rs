use std::collections::BTreeMap;

use ag_fetcher::Fetcher;
use ag_store::{MirrorRepository, Source};
use bytes::Bytes;

use crate::url_builder::build_outbound_url;

/// One source's validated response, emitted by the primary-then-mirrors
/// ladder (spec §4.5.1).
#[derive(Debug, Clone)]
pub struct LadderSuccess {
    pub source_name: String,
    pub used_mirror: bool,
    pub synthetic_source_url: String,
    pub bytes: Bytes,
}

/// Synthetic name for a mirror, matching the example scenario's
/// `X-Source` value (e.g. `a-mirror`, `a-mirror2`, ...).
pub fn mirror_tag(source_name: &str, mirror_index: usize) -> String {
    if mirror_index == 0 {
        format!("{source_name}-mirror")
    } else {
        format!("{source_name}-mirror{}", mirror_index + 1)
    }
}

/// Run one source's primary-then-mirrors ladder (spec §4.5.1 steps 1-3):
/// try the primary base, and on failure or validation failure, try each
/// fallback mirror in priority order. Emits the first validated response,
/// or `None` if nothing on the ladder validates.
pub async fn run_ladder(
    fetcher: &Fetcher,
    mirrors: &MirrorRepository,
    source: &Source,
    endpoint_path: &str,
    params: &BTreeMap<String, String>,
) -> Option<LadderSuccess> {
    let primary_url = build_outbound_url(&source.base_url, endpoint_path, params);
    let primary = fetcher.fetch(&primary_url, &source.name, false).await;
    if primary.is_success() {
        if let Some(bytes) = &primary.bytes {
            if ag_validator::validate(endpoint_path, bytes).is_ok() {
                return Some(LadderSuccess {
                    source_name: source.name.clone(),
                    used_mirror: false,
                    synthetic_source_url: primary_url,
                    bytes: bytes.clone(),
                });
            }
        }
    }

    let fallback_mirrors = mirrors.find_active_by_source(source.id).await.unwrap_or_default();
    for (idx, mirror) in fallback_mirrors.iter().enumerate() {
        let tag = mirror_tag(&source.name, idx);
        let mirror_url = build_outbound_url(&mirror.mirror_url, endpoint_path, params);
        let resp = fetcher.fetch(&mirror_url, &tag, true).await;
        if !resp.is_success() {
            continue;
        }
        if let Some(bytes) = &resp.bytes {
            if ag_validator::validate(endpoint_path, bytes).is_ok() {
                return Some(LadderSuccess { source_name: tag, used_mirror: true, synthetic_source_url: mirror_url, bytes: bytes.clone() });
            }
        }
    }

    None
}

/// Run the full standard fan-out: every primary-active source's ladder,
/// concurrently (spec §4.5.1). Returns every source that produced a
/// validated response.
pub async fn standard_fan_out(
    fetcher: &Fetcher,
    mirrors: &MirrorRepository,
    sources: &[Source],
    endpoint_path: &str,
    params: &BTreeMap<String, String>,
) -> Vec<LadderSuccess> {
    let eligible: Vec<Source> = sources.iter().filter(|s| s.is_primary && s.active).cloned().collect();

    let mut set = tokio::task::JoinSet::new();
    for source in eligible {
        let fetcher = fetcher.clone();
        let mirrors = mirrors.clone();
        let endpoint_path = endpoint_path.to_string();
        let params = params.clone();
        set.spawn(async move { run_ladder(&fetcher, &mirrors, &source, &endpoint_path, &params).await });
    }

    let mut successes = Vec::new();
    while let Some(result) = set.join_next().await {
        if let Ok(Some(success)) = result {
            successes.push(success);
        }
    }
    successes
}
