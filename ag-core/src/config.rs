//! Environment-driven configuration.
//!
//! Unlike the layered YAML + `.env` + environment resolution the reference
//! framework supports, this gateway's process configuration is environment
//! variables only (spec §6) — so this is a trimmed `R2eConfig`: a flat map,
//! typed accessors, and a fallback default per key. Every key is read once
//! at process start.

use std::collections::HashMap;
use std::time::Duration;

/// Error type for configuration operations, matching the shape of the
/// reference framework's own `ConfigError`.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// The requested key was not found and no default applies.
    NotFound(String),
    /// The raw string value could not be parsed to the requested type.
    TypeMismatch { key: String, expected: &'static str },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "config key '{key}' is not a valid {expected}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Flat key-value configuration, sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    /// Build a config from an explicit map — used in tests to avoid
    /// depending on the ambient process environment.
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or(default).to_string()
    }

    pub fn get_u64(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => v.parse().map_err(|_| ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: "u64",
            }),
        }
    }

    pub fn get_secs(&self, key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
        self.get_u64(key, default_secs).map(Duration::from_secs)
    }

    pub fn require_str(&self, key: &str) -> Result<String, ConfigError> {
        self.raw(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// Every `(key, value)` pair whose key starts with `prefix` — used to
    /// discover `API_SOURCE_<NAME>_URL`-style variables without knowing the
    /// source names ahead of time.
    pub fn with_prefix(&self, prefix: &str) -> Vec<(&str, &str)> {
        self.values
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// The gateway's resolved process configuration (spec §6's table).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_port: u16,
    pub database_path: String,
    pub cache_addr: String,
    pub cache_db_index: u64,
    pub request_timeout: Duration,
    pub max_concurrency: u64,
    pub rate_limit: u64,
    pub rate_limit_window: Duration,
    pub health_check_interval: Duration,
}

impl GatewayConfig {
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            listen_port: config.get_u64("GATEWAY_LISTEN_PORT", 8080)? as u16,
            database_path: config.get_str("GATEWAY_DATABASE_PATH", "./data.db"),
            cache_addr: config.get_str("GATEWAY_CACHE_ADDR", "localhost:6379"),
            cache_db_index: config.get_u64("GATEWAY_CACHE_DB_INDEX", 0)?,
            request_timeout: config.get_secs("GATEWAY_REQUEST_TIMEOUT_SECS", 20)?,
            max_concurrency: config.get_u64("GATEWAY_MAX_CONCURRENCY", 10)?,
            rate_limit: config.get_u64("GATEWAY_RATE_LIMIT", 100)?,
            rate_limit_window: config.get_secs("GATEWAY_RATE_LIMIT_WINDOW_SECS", 60)?,
            health_check_interval: config.get_secs("GATEWAY_HEALTH_CHECK_INTERVAL_SECS", 600)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_map(HashMap::new());
        let gw = GatewayConfig::load(&cfg).unwrap();
        assert_eq!(gw.listen_port, 8080);
        assert_eq!(gw.database_path, "./data.db");
        assert_eq!(gw.rate_limit, 100);
        assert_eq!(gw.health_check_interval, Duration::from_secs(600));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = Config::from_map(map(&[
            ("GATEWAY_LISTEN_PORT", "9090"),
            ("GATEWAY_RATE_LIMIT", "25"),
        ]));
        let gw = GatewayConfig::load(&cfg).unwrap();
        assert_eq!(gw.listen_port, 9090);
        assert_eq!(gw.rate_limit, 25);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let cfg = Config::from_map(map(&[("GATEWAY_LISTEN_PORT", "not-a-port")]));
        let err = GatewayConfig::load(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn with_prefix_collects_matching_keys() {
        let cfg = Config::from_map(map(&[
            ("API_SOURCE_GOMUNIME_URL", "http://a"),
            ("API_SOURCE_OTAKUDESU_URL", "http://b"),
            ("OTHER_KEY", "x"),
        ]));
        let mut found = cfg.with_prefix("API_SOURCE_");
        found.sort();
        assert_eq!(
            found,
            vec![
                ("API_SOURCE_GOMUNIME_URL", "http://a"),
                ("API_SOURCE_OTAKUDESU_URL", "http://b"),
            ]
        );
    }
}
