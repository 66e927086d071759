use std::collections::BTreeMap;

use ag_core::Config;

/// One upstream source as declared by configuration, prior to any
/// endpoint association (spec §6 "Upstream sources are declared through any
/// of three equivalent channels").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDeclaration {
    pub name: String,
    pub base_url: String,
}

/// Legacy individual variables this gateway understands, each naming one
/// hardcoded upstream. Not extensible at runtime — new upstreams should use
/// channel (a) or (b).
const LEGACY_VARS: &[(&str, &str)] = &[
    ("GOMUNIME_URL", "gomunime"),
    ("OTAKUDESU_URL", "otakudesu"),
    ("SAMEHADAKU_URL", "samehadaku"),
    ("ANIMEINDO_URL", "animeindo"),
];

/// Resolves the configured source map using the documented precedence:
/// (a) a single JSON map, (b) `API_SOURCE_<NAME>_URL` variables, (c) legacy
/// individual variables. The first channel with any entries wins; channels
/// are never merged (spec §6).
pub fn load(config: &Config) -> Vec<SourceDeclaration> {
    if let Some(from_json) = load_json_map(config) {
        if !from_json.is_empty() {
            return from_json;
        }
    }

    let from_prefixed = load_prefixed_vars(config);
    if !from_prefixed.is_empty() {
        return from_prefixed;
    }

    load_legacy_vars(config)
}

fn load_json_map(config: &Config) -> Option<Vec<SourceDeclaration>> {
    let raw = config.get_str("GATEWAY_SOURCE_MAP", "");
    if raw.is_empty() {
        return None;
    }
    let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).ok()?;
    Some(
        parsed
            .into_iter()
            .map(|(name, base_url)| SourceDeclaration { name: name.to_lowercase(), base_url })
            .collect(),
    )
}

fn load_prefixed_vars(config: &Config) -> Vec<SourceDeclaration> {
    const PREFIX: &str = "API_SOURCE_";
    const SUFFIX: &str = "_URL";

    config
        .with_prefix(PREFIX)
        .into_iter()
        .filter_map(|(key, value)| {
            let middle = key.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
            if middle.is_empty() {
                return None;
            }
            Some(SourceDeclaration { name: middle.to_lowercase(), base_url: value.to_string() })
        })
        .collect()
}

fn load_legacy_vars(config: &Config) -> Vec<SourceDeclaration> {
    LEGACY_VARS
        .iter()
        .filter_map(|(var, name)| {
            let value = config.get_str(var, "");
            if value.is_empty() {
                None
            } else {
                Some(SourceDeclaration { name: name.to_string(), base_url: value })
            }
        })
        .collect()
}

/// Known detail-rich upstreams, most favored first. Used only to break ties
/// when seeding priorities for detail endpoints (spec §6's seeding
/// heuristic — "detail endpoints favor detail-rich sources").
const DETAIL_PREFERENCE: &[&str] = &["otakudesu", "samehadaku", "gomunime", "animeindo"];

/// Known aggregator-style upstreams, most favored first, for list endpoints.
const LIST_PREFERENCE: &[&str] = &["gomunime", "samehadaku", "otakudesu", "animeindo"];

/// Assign a seeding priority (lower = earlier preference, matching
/// `Source.priority`) for `source_name` against `endpoint_path`. Sources
/// absent from the relevant preference list sort alphabetically after every
/// preferred name.
pub fn seed_priority(endpoint_path: &str, source_name: &str) -> i64 {
    let preference = if endpoint_path.contains("detail") { DETAIL_PREFERENCE } else { LIST_PREFERENCE };

    match preference.iter().position(|&n| n == source_name) {
        Some(rank) => rank as i64,
        None => preference.len() as i64 + alphabetical_rank(source_name),
    }
}

fn alphabetical_rank(name: &str) -> i64 {
    name.bytes().next().map(i64::from).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_map(map)
    }

    #[test]
    fn json_map_takes_precedence() {
        let config = config_with(&[
            ("GATEWAY_SOURCE_MAP", r#"{"Gomunime":"http://g"}"#),
            ("API_SOURCE_OTAKUDESU_URL", "http://o"),
        ]);
        let decls = load(&config);
        assert_eq!(decls, vec![SourceDeclaration { name: "gomunime".into(), base_url: "http://g".into() }]);
    }

    #[test]
    fn prefixed_vars_used_when_no_json_map() {
        let config = config_with(&[("API_SOURCE_OTAKUDESU_URL", "http://o")]);
        let decls = load(&config);
        assert_eq!(decls, vec![SourceDeclaration { name: "otakudesu".into(), base_url: "http://o".into() }]);
    }

    #[test]
    fn legacy_vars_used_as_last_resort() {
        let config = config_with(&[("GOMUNIME_URL", "http://g")]);
        let decls = load(&config);
        assert_eq!(decls, vec![SourceDeclaration { name: "gomunime".into(), base_url: "http://g".into() }]);
    }

    #[test]
    fn detail_endpoints_favor_detail_rich_sources() {
        assert!(seed_priority("/api/v1/anime-detail", "otakudesu") < seed_priority("/api/v1/anime-detail", "animeindo"));
    }

    #[test]
    fn list_endpoints_favor_aggregator_sources() {
        assert!(seed_priority("/api/v1/home", "gomunime") < seed_priority("/api/v1/home", "animeindo"));
    }
}
