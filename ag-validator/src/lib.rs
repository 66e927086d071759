//! Stateless response validation (spec §4.4). `validate` has no I/O and no
//! shared state — it is invoked once per candidate upstream response,
//! before that response may be selected, aggregated, or cached.

pub mod placeholder;
pub mod schema;

use schema::{ArrayShape, Field, FieldKind};
use serde_json::Value;

pub use schema::{schema_for, EndpointSchema};

/// Why a candidate response failed validation. Carried into logging and
/// (in `RequestContext`-adjacent code) discarded before a client ever sees
/// it — validation failure is an internal selection signal, not a client
/// error on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    NotJsonObject,
    MissingConfidenceScore,
    ConfidenceTooLow(String),
    UnknownEndpoint(String),
    MissingOrEmptyField(String),
    InvalidUrl(String),
    PlaceholderValue(String),
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::NotJsonObject => write!(f, "response is not a JSON object"),
            ValidationFailure::MissingConfidenceScore => write!(f, "missing numeric confidence_score"),
            ValidationFailure::ConfidenceTooLow(v) => write!(f, "confidence_score {v} below 0.5"),
            ValidationFailure::UnknownEndpoint(e) => write!(f, "no validation schema for endpoint {e}"),
            ValidationFailure::MissingOrEmptyField(field) => write!(f, "missing or empty required field {field}"),
            ValidationFailure::InvalidUrl(field) => write!(f, "field {field} is not a valid URL"),
            ValidationFailure::PlaceholderValue(field) => write!(f, "field {field} contains placeholder text"),
        }
    }
}

/// Validate `bytes` as a response to `endpoint`. `endpoint` is the literal
/// routed path (the orchestrator resolves any variable segment before
/// calling this).
pub fn validate(endpoint: &str, bytes: &[u8]) -> Result<(), ValidationFailure> {
    let schema = schema_for(endpoint).ok_or_else(|| ValidationFailure::UnknownEndpoint(endpoint.to_string()))?;

    let value: Value = serde_json::from_slice(bytes).map_err(|_| ValidationFailure::NotJsonObject)?;
    let obj = value.as_object().ok_or(ValidationFailure::NotJsonObject)?;

    let confidence = obj.get("confidence_score").ok_or(ValidationFailure::MissingConfidenceScore)?;
    let confidence = confidence.as_f64().ok_or(ValidationFailure::MissingConfidenceScore)?;
    if confidence < 0.5 {
        return Err(ValidationFailure::ConfidenceTooLow(confidence.to_string()));
    }

    for key in schema.required_top_level {
        check_present_and_non_empty(obj, key)?;
    }

    for field in schema.top_level_fields {
        let raw = obj.get(field.name).ok_or_else(|| ValidationFailure::MissingOrEmptyField(field.name.to_string()))?;
        check_field(field, raw)?;
    }

    for (shape, item_fields) in schema.arrays {
        validate_array_shape(obj, *shape, item_fields)?;
    }

    Ok(())
}

fn check_present_and_non_empty(obj: &serde_json::Map<String, Value>, key: &str) -> Result<(), ValidationFailure> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ValidationFailure::MissingOrEmptyField(key.to_string())),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationFailure::MissingOrEmptyField(key.to_string())),
        Some(Value::Array(a)) if a.is_empty() => Err(ValidationFailure::MissingOrEmptyField(key.to_string())),
        Some(Value::Object(o)) if o.is_empty() => Err(ValidationFailure::MissingOrEmptyField(key.to_string())),
        Some(_) => Ok(()),
    }
}

fn validate_array_shape(
    obj: &serde_json::Map<String, Value>,
    shape: ArrayShape,
    item_fields: &[Field],
) -> Result<(), ValidationFailure> {
    match shape {
        ArrayShape::Array(key) => {
            let items = obj.get(key).and_then(Value::as_array).ok_or_else(|| ValidationFailure::MissingOrEmptyField(key.to_string()))?;
            for item in items {
                validate_item(item, item_fields)?;
            }
            Ok(())
        }
        ArrayShape::ObjectOfArrays(key) => {
            let map = obj.get(key).and_then(Value::as_object).ok_or_else(|| ValidationFailure::MissingOrEmptyField(key.to_string()))?;
            for value in map.values() {
                let items = value.as_array().ok_or_else(|| ValidationFailure::MissingOrEmptyField(key.to_string()))?;
                for item in items {
                    validate_item(item, item_fields)?;
                }
            }
            Ok(())
        }
    }
}

fn validate_item(item: &Value, fields: &[Field]) -> Result<(), ValidationFailure> {
    let obj = item.as_object().ok_or_else(|| ValidationFailure::MissingOrEmptyField("item".to_string()))?;
    for field in fields {
        let raw = obj.get(field.name).ok_or_else(|| ValidationFailure::MissingOrEmptyField(field.name.to_string()))?;
        check_field(field, raw)?;
    }
    Ok(())
}

fn check_field(field: &Field, raw: &Value) -> Result<(), ValidationFailure> {
    let text = raw.as_str().ok_or_else(|| ValidationFailure::MissingOrEmptyField(field.name.to_string()))?;
    if text.is_empty() {
        return Err(ValidationFailure::MissingOrEmptyField(field.name.to_string()));
    }
    if field.kind == FieldKind::Url {
        let is_valid_url = url::Url::parse(text).map(|u| u.host().is_some()).unwrap_or(false);
        if !is_valid_url {
            return Err(ValidationFailure::InvalidUrl(field.name.to_string()));
        }
    }
    if placeholder::is_placeholder(text) {
        return Err(ValidationFailure::PlaceholderValue(field.name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_payload(url_value: &str) -> String {
        format!(
            r#"{{"confidence_score":0.9,"message":"ok","source":"a","data":[{{"judul":"Naruto","url":"{url_value}","anime_slug":"naruto","cover":"https://ex/n.jpg","status":"","tipe":"","skor":"","penonton":"","sinopsis":"","genre":[]}}]}}"#
        )
    }

    #[test]
    fn accepts_a_well_formed_search_response() {
        let payload = search_payload("https://ex/n");
        assert!(validate("/api/v1/search", payload.as_bytes()).is_ok());
    }

    #[test]
    fn rejects_non_json() {
        let err = validate("/api/v1/search", b"not json").unwrap_err();
        assert_eq!(err, ValidationFailure::NotJsonObject);
    }

    #[test]
    fn rejects_low_confidence() {
        let payload = r#"{"confidence_score":0.1,"data":[]}"#;
        let err = validate("/api/v1/search", payload.as_bytes()).unwrap_err();
        assert!(matches!(err, ValidationFailure::ConfidenceTooLow(_)));
    }

    #[test]
    fn rejects_missing_data_array() {
        let payload = r#"{"confidence_score":0.9}"#;
        let err = validate("/api/v1/search", payload.as_bytes()).unwrap_err();
        assert_eq!(err, ValidationFailure::MissingOrEmptyField("data".to_string()));
    }

    #[test]
    fn rejects_malformed_url_field() {
        let payload = search_payload("not-a-url");
        let err = validate("/api/v1/search", payload.as_bytes()).unwrap_err();
        assert_eq!(err, ValidationFailure::InvalidUrl("url".to_string()));
    }

    #[test]
    fn rejects_placeholder_text() {
        let payload = r#"{"confidence_score":0.9,"data":[{"judul":"404 Not Found","url":"https://ex/n","anime_slug":"naruto","cover":"https://ex/n.jpg"}]}"#;
        let err = validate("/api/v1/search", payload.as_bytes()).unwrap_err();
        assert_eq!(err, ValidationFailure::PlaceholderValue("judul".to_string()));
    }

    #[test]
    fn resolves_parameterized_jadwal_rilis_day_path_to_array_shape() {
        let payload = r#"{"confidence_score":0.9,"data":[{"title":"Naruto","url":"https://ex/n","anime_slug":"naruto","cover_url":"https://ex/n.jpg"}]}"#;
        assert!(validate("/api/v1/jadwal-rilis/monday", payload.as_bytes()).is_ok());
    }

    #[test]
    fn jadwal_rilis_base_path_expects_object_of_arrays() {
        let payload = r#"{"confidence_score":0.9,"data":{"monday":[{"title":"Naruto","url":"https://ex/n","anime_slug":"naruto","cover_url":"https://ex/n.jpg"}]}}"#;
        assert!(validate("/api/v1/jadwal-rilis", payload.as_bytes()).is_ok());
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let err = validate("/api/v1/unknown", b"{}").unwrap_err();
        assert!(matches!(err, ValidationFailure::UnknownEndpoint(_)));
    }

    #[test]
    fn episode_detail_requires_streaming_servers() {
        let payload = r#"{"confidence_score":0.9,"title":"Ep 1","thumbnail_url":"https://ex/t.jpg","streaming_servers":[{"server_name":"A","streaming_url":"https://ex/s1"}]}"#;
        assert!(validate("/api/v1/episode-detail", payload.as_bytes()).is_ok());
    }

    #[test]
    fn home_validates_each_of_its_three_lists() {
        let item = r#"{"judul":"X","url":"https://ex/x","anime_slug":"x","cover":"https://ex/x.jpg"}"#;
        let payload = format!(
            r#"{{"confidence_score":0.9,"top10":[{item}],"new_eps":[{item}],"movies":[{item}],"jadwal_rilis":{{"monday":[]}}}}"#
        );
        assert!(validate("/api/v1/home", payload.as_bytes()).is_ok());
    }
}
