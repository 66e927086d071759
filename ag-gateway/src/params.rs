use std::collections::BTreeMap;

pub use ag_cache::INTERNAL_PARAMS;

/// Accepted aliases for a resource identifier on `/api/v1/anime-detail`
/// (spec §3 "Parameter normalization for detail endpoints").
pub const DETAIL_ALIASES: &[&str] = &["id", "slug", "anime_slug"];

/// Accepted aliases for an episode identifier on `/api/v1/episode-detail`.
pub const EPISODE_ALIASES: &[&str] = &["id", "episode_url", "episode_slug"];

/// If any accepted alias is populated, copy its value into every other
/// alias. Returns an error naming the alias set if none are populated.
pub fn normalize_aliases(params: &mut BTreeMap<String, String>, aliases: &[&str]) -> Result<(), String> {
    let value = aliases.iter().find_map(|a| params.get(*a).filter(|v| !v.is_empty()).cloned());

    match value {
        Some(value) => {
            for alias in aliases {
                params.insert(alias.to_string(), value.clone());
            }
            Ok(())
        }
        None => Err(describe_required(aliases)),
    }
}

/// Renders `["id", "slug", "anime_slug"]` as `one of 'id', 'slug', or
/// 'anime_slug' is required`, matching the client-facing error wording.
fn describe_required(aliases: &[&str]) -> String {
    match aliases {
        [only] => format!("'{only}' is required"),
        [rest @ .., last] => {
            let quoted: Vec<String> = rest.iter().map(|a| format!("'{a}'")).collect();
            format!("one of {}, or '{last}' is required", quoted.join(", "))
        }
        [] => "a required parameter is missing".to_string(),
    }
}

/// Endpoint-specific forwarding rename (spec §3 — `q` → `query` for
/// search). Applied before internal-parameter filtering.
pub fn rename_for_forwarding(endpoint_path: &str, params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut out = params.clone();
    if endpoint_path == "/api/v1/search" {
        if let Some(value) = out.remove("q") {
            out.insert("query".to_string(), value);
        }
    }
    out
}

/// Drop `category` and `aggregate` — they steer orchestration but must
/// never reach an upstream (spec §8's "No-forward of internal parameters").
pub fn strip_internal(params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    params
        .iter()
        .filter(|(k, _)| !INTERNAL_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Strip one trailing path segment, e.g. `/api/v1/jadwal-rilis/monday` →
/// `/api/v1/jadwal-rilis` (spec §3 "Parameterized endpoint resolution").
/// Returns `None` if there is no segment left to strip.
pub fn base_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    let idx = trimmed.rfind('/')?;
    if idx == 0 {
        return None;
    }
    Some(trimmed[..idx].to_string())
}
