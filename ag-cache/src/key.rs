use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Parameters that steer orchestration but are never part of a cache key's
/// hashed component (spec §3 "internal vs. external parameters" — the same
/// set the outbound URL builder filters out).
pub const INTERNAL_PARAMS: &[&str] = &["category", "aggregate"];

/// Stable cache key: `category:endpoint:hash(sorted external params)`.
///
/// `params` is sorted (a `BTreeMap` gives us that for free) before hashing
/// so that two requests differing only in parameter order hash identically.
pub fn make_key(category: &str, endpoint: &str, params: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for (k, v) in params {
        if INTERNAL_PARAMS.contains(&k.as_str()) {
            continue;
        }
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }
    let digest = hasher.finalize();
    format!("{category}:{endpoint}:{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn key_is_stable_under_param_reordering() {
        let a = make_key("anime", "/api/v1/search", &params(&[("q", "naruto"), ("page", "1")]));
        let b = make_key("anime", "/api/v1/search", &params(&[("page", "1"), ("q", "naruto")]));
        assert_eq!(a, b);
    }

    #[test]
    fn internal_params_do_not_affect_the_key() {
        let a = make_key("anime", "/api/v1/search", &params(&[("q", "naruto")]));
        let b = make_key(
            "anime",
            "/api/v1/search",
            &params(&[("q", "naruto"), ("aggregate", "true"), ("category", "anime")]),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn different_params_yield_different_keys() {
        let a = make_key("anime", "/api/v1/search", &params(&[("q", "naruto")]));
        let b = make_key("anime", "/api/v1/search", &params(&[("q", "bleach")]));
        assert_ne!(a, b);
    }
}
