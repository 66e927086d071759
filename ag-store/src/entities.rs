use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Endpoint {
    pub id: i64,
    pub category_id: i64,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Source {
    pub id: i64,
    pub endpoint_id: i64,
    pub name: String,
    pub base_url: String,
    pub priority: i64,
    pub is_primary: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mirror {
    pub id: i64,
    pub source_id: i64,
    pub mirror_url: String,
    pub priority: i64,
    pub active: bool,
}

/// Status recorded by a single probe (spec §3's entity table / §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Ok,
    Timeout,
    Error,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "OK",
            HealthStatus::Timeout => "TIMEOUT",
            HealthStatus::Error => "ERROR",
            HealthStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "OK" => HealthStatus::Ok,
            "TIMEOUT" => HealthStatus::Timeout,
            "ERROR" => HealthStatus::Error,
            _ => HealthStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthObservation {
    pub id: i64,
    pub source_id: i64,
    pub status: HealthStatus,
    pub elapsed_ms: i64,
    pub error_text: Option<String>,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestObservation {
    pub id: i64,
    pub endpoint_path: String,
    pub category_name: String,
    pub source_used: Option<String>,
    pub fallback_used: bool,
    pub elapsed_ms: i64,
    pub http_status: i64,
    pub client_addr: Option<String>,
    pub user_agent: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// A source joined with its health status, used by `get_health_status`
/// (spec §4.7 — "sources never probed return `UNKNOWN`").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source_id: i64,
    pub source_name: String,
    pub endpoint_id: i64,
    pub status: HealthStatus,
    pub elapsed_ms: Option<i64>,
    pub observed_at: Option<DateTime<Utc>>,
}
