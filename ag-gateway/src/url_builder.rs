use std::collections::BTreeMap;

use crate::params::{rename_for_forwarding, strip_internal};

/// Build the outbound URL for one upstream call: base + endpoint path +
/// filtered and renamed query string (spec §4.5.1 step 1).
pub fn build_outbound_url(base_url: &str, endpoint_path: &str, params: &BTreeMap<String, String>) -> String {
    let renamed = rename_for_forwarding(endpoint_path, params);
    let forwarded = strip_internal(&renamed);

    let mut url = format!("{}{}", base_url.trim_end_matches('/'), endpoint_path);
    if !forwarded.is_empty() {
        url.push('?');
        url.push_str(&query_string(&forwarded));
    }
    url
}

fn query_string(params: &BTreeMap<String, String>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_renames_q_and_drops_category() {
        let params: BTreeMap<String, String> =
            [("q".to_string(), "naruto".to_string()), ("category".to_string(), "anime".to_string())].into();
        let url = build_outbound_url("http://A", "/api/v1/search", &params);
        assert_eq!(url, "http://A/api/v1/search?query=naruto");
    }

    #[test]
    fn no_params_yields_bare_path() {
        let url = build_outbound_url("http://A/", "/api/v1/home", &BTreeMap::new());
        assert_eq!(url, "http://A/api/v1/home");
    }
}
