use std::collections::BTreeMap;

use ag_fetcher::Fetcher;
use ag_store::Store;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::aggregator::aggregate;
use crate::error::GatewayError;
use crate::fan_out::standard_fan_out;

/// Result of `category=all` (spec §4.5.2). Independent fan-out per active
/// category, combined into one envelope.
pub struct CrossCategoryResult {
    pub bytes: Bytes,
    pub categories: Vec<String>,
    pub sources: Vec<String>,
}

/// Run the standard fan-out independently for every active category that
/// declares `endpoint_path`, then combine whatever succeeded. Fails only if
/// every category comes up empty.
pub async fn run_cross_category(
    store: &Store,
    fetcher: &Fetcher,
    endpoint_path: &str,
    params: &BTreeMap<String, String>,
) -> Result<CrossCategoryResult, GatewayError> {
    let categories = store.categories.find_all().await.map_err(|_| GatewayError::NoSources)?;
    let active: Vec<_> = categories.into_iter().filter(|c| c.active).collect();
    if active.is_empty() {
        return Err(GatewayError::NoSources);
    }

    let mut data_by_category = Map::new();
    let mut categories_with_data = Vec::new();
    let mut all_sources = Vec::new();

    for category in &active {
        let endpoint = match store.endpoints.find_by_category_and_path(category.id, endpoint_path).await {
            Ok(Some(endpoint)) => endpoint,
            _ => continue,
        };
        let sources = store.sources.find_active_by_endpoint(endpoint.id).await.unwrap_or_default();
        if sources.is_empty() {
            continue;
        }

        let successes = standard_fan_out(fetcher, &store.mirrors, &sources, endpoint_path, params).await;
        if successes.is_empty() {
            continue;
        }

        let (bytes, contributing) = if successes.len() == 1 {
            (successes[0].bytes.clone(), vec![successes[0].source_name.clone()])
        } else {
            match aggregate(endpoint_path, &successes) {
                Some(aggregated) => (aggregated.bytes, aggregated.sources),
                None => (successes[0].bytes.clone(), vec![successes[0].source_name.clone()]),
            }
        };

        let Ok(value) = serde_json::from_slice::<Value>(&bytes) else { continue };
        data_by_category.insert(category.name.clone(), value);
        categories_with_data.push(category.name.clone());
        all_sources.extend(contributing);
    }

    if categories_with_data.is_empty() {
        return Err(GatewayError::AllSourcesFailed(endpoint_path.to_string()));
    }

    let envelope = Value::Object(
        [
            ("confidence_score".to_string(), Value::from(1.0)),
            (
                "message".to_string(),
                Value::String(format!("aggregated across {} categories", categories_with_data.len())),
            ),
            ("categories".to_string(), Value::Array(categories_with_data.iter().cloned().map(Value::String).collect())),
            ("sources".to_string(), Value::Array(all_sources.iter().cloned().map(Value::String).collect())),
            ("data_by_category".to_string(), Value::Object(data_by_category)),
        ]
        .into_iter()
        .collect(),
    );

    let bytes = serde_json::to_vec(&envelope).map_err(|_| GatewayError::AllSourcesFailed(endpoint_path.to_string()))?;
    Ok(CrossCategoryResult { bytes: Bytes::from(bytes), categories: categories_with_data, sources: all_sources })
}
