use bytes::Bytes;
use serde_json::{Map, Value};

use crate::fan_out::LadderSuccess;

/// Result of the aggregator (spec §4.5.3). `sources` is always the list of
/// contributing source names, used for the `sources` envelope field and for
/// request-logging metadata.
pub struct AggregatedResult {
    pub bytes: Bytes,
    pub sources: Vec<String>,
}

/// Union multiple validated responses per the endpoint's aggregation rule.
/// `successes` must have at least two elements. On any marshalling failure,
/// returns `None` — the caller falls back to the first successful response
/// unchanged (spec §4.5.3's "Marshalling failure" clause).
pub fn aggregate(endpoint_path: &str, successes: &[LadderSuccess]) -> Option<AggregatedResult> {
    let sources: Vec<String> = successes.iter().map(|s| s.source_name.clone()).collect();

    let parsed: Option<Vec<Value>> = successes.iter().map(|s| serde_json::from_slice::<Value>(&s.bytes).ok()).collect();
    let parsed = parsed?;

    let merged = match endpoint_path {
        "/api/v1/home" => aggregate_home(&parsed),
        "/api/v1/anime-detail" | "/api/v1/episode-detail" => {
            return Some(AggregatedResult { bytes: successes[0].bytes.clone(), sources });
        }
        "/api/v1/jadwal-rilis" => aggregate_jadwal_rilis(&parsed),
        _ => aggregate_data_list(&parsed),
    }?;

    let bytes = serde_json::to_vec(&merged).ok()?;
    Some(AggregatedResult { bytes: Bytes::from(bytes), sources })
}

fn aggregate_home(parsed: &[Value]) -> Option<Value> {
    let mut top10 = Vec::new();
    let mut new_eps = Vec::new();
    let mut movies = Vec::new();
    let mut jadwal_rilis = Vec::new();

    for value in parsed {
        let obj = value.as_object()?;
        extend_array(&mut top10, obj.get("top10"));
        extend_array(&mut new_eps, obj.get("new_eps"));
        extend_array(&mut movies, obj.get("movies"));
        if let Some(jr) = obj.get("jadwal_rilis") {
            jadwal_rilis.push(jr.clone());
        }
    }

    Some(Value::Object(
        [
            ("confidence_score".to_string(), Value::from(1.0)),
            ("message".to_string(), Value::String(format!("aggregated from {} sources", parsed.len()))),
            ("top10".to_string(), Value::Array(top10)),
            ("new_eps".to_string(), Value::Array(new_eps)),
            ("movies".to_string(), Value::Array(movies)),
            ("jadwal_rilis".to_string(), Value::Array(jadwal_rilis)),
        ]
        .into_iter()
        .collect(),
    ))
}

fn aggregate_jadwal_rilis(parsed: &[Value]) -> Option<Value> {
    let mut merged: Map<String, Value> = Map::new();

    for value in parsed {
        let data = value.as_object()?.get("data")?.as_object()?;
        for (day, items) in data {
            let entry = merged.entry(day.clone()).or_insert_with(|| Value::Array(Vec::new()));
            extend_array(entry.as_array_mut()?, Some(items));
        }
    }

    Some(Value::Object(
        [
            ("confidence_score".to_string(), Value::from(1.0)),
            ("message".to_string(), Value::String(format!("aggregated from {} sources", parsed.len()))),
            ("data".to_string(), Value::Object(merged)),
        ]
        .into_iter()
        .collect(),
    ))
}

/// Handles `/api/v1/anime-terbaru`, `/api/v1/movie`, `/api/v1/search`, and
/// the "any other path" fallback rule — all concatenate `data` with
/// dedup-by-identity for object items.
fn aggregate_data_list(parsed: &[Value]) -> Option<Value> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();

    for value in parsed {
        let data = value.as_object()?.get("data")?.as_array()?;
        for item in data {
            match item.as_object() {
                Some(obj) => {
                    let key = dedup_key(obj);
                    match key {
                        Some(key) if seen.contains(&key) => continue,
                        Some(key) => {
                            seen.insert(key);
                            merged.push(item.clone());
                        }
                        None => merged.push(item.clone()),
                    }
                }
                None => merged.push(item.clone()),
            }
        }
    }

    Some(Value::Object(
        [
            ("confidence_score".to_string(), Value::from(1.0)),
            ("message".to_string(), Value::String(format!("aggregated from {} sources", parsed.len()))),
            ("data".to_string(), Value::Array(merged)),
        ]
        .into_iter()
        .collect(),
    ))
}

/// First-non-empty of `anime_slug`, `judul`, `url` (spec §4.5.3).
fn dedup_key(obj: &Map<String, Value>) -> Option<String> {
    for field in ["anime_slug", "judul", "url"] {
        if let Some(value) = obj.get(field).and_then(Value::as_str) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn extend_array(target: &mut Vec<Value>, source: Option<&Value>) {
    if let Some(Value::Array(items)) = source {
        target.extend(items.iter().cloned());
    }
}
