//! Outbound HTTP fetcher (spec §4.3). One GET per call, with a configurable
//! timeout and bounded redirect following; every failure mode returns a
//! populated [`FetchResponse`] rather than a `Result` error, since the
//! orchestrator treats "upstream failed" as ordinary fan-out data, not an
//! exceptional control-flow path.

use std::time::{Duration, Instant};

use bytes::Bytes;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = "aggregation-gateway/0.1";

/// Outcome of one outbound fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub source_tag: String,
    pub is_mirror: bool,
    pub status: Option<u16>,
    pub elapsed: Duration,
    pub bytes: Option<Bytes>,
    pub error: Option<String>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.bytes.is_some()
    }

    fn failed(source_tag: &str, is_mirror: bool, elapsed: Duration, status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            source_tag: source_tag.to_string(),
            is_mirror,
            status,
            elapsed,
            bytes: None,
            error: Some(error.into()),
        }
    }
}

/// Wraps a single `reqwest::Client`, shared across every outbound fetch for
/// the process lifetime (grounded on the reference framework's
/// `ProductClient` — one client instance reused across calls, never built
/// per-request).
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(default_headers())
            .build()
            .expect("reqwest client configuration is static and always valid");
        Self { client }
    }

    pub fn with_default_timeout() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }

    /// Issue one outbound GET. `source_tag` identifies the source (or
    /// mirror synthetic name) for logging and `X-Source` reporting further
    /// up the stack; `is_mirror` is carried through unchanged for the
    /// bruteforce resolver's metadata.
    pub async fn fetch(&self, url: &str, source_tag: &str, is_mirror: bool) -> FetchResponse {
        let start = Instant::now();

        if url.is_empty() {
            return FetchResponse::failed(source_tag, is_mirror, start.elapsed(), None, "empty URL");
        }

        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                return FetchResponse::failed(source_tag, is_mirror, start.elapsed(), err.status().map(|s| s.as_u16()), err.to_string());
            }
        };

        let status = resp.status();
        if !status.is_success() && !status.is_redirection() {
            return FetchResponse::failed(source_tag, is_mirror, start.elapsed(), Some(status.as_u16()), format!("upstream returned {status}"));
        }

        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(err) => {
                return FetchResponse::failed(source_tag, is_mirror, start.elapsed(), Some(status.as_u16()), err.to_string());
            }
        };

        if status.is_success() && body.is_empty() {
            return FetchResponse::failed(source_tag, is_mirror, start.elapsed(), Some(status.as_u16()), "empty body");
        }

        FetchResponse {
            source_tag: source_tag.to_string(),
            is_mirror,
            status: Some(status.as_u16()),
            elapsed: start.elapsed(),
            bytes: Some(body),
            error: None,
        }
    }
}

fn default_headers() -> reqwest::header::HeaderMap {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(reqwest::header::ACCEPT, "application/json".parse().unwrap());
    headers.insert(reqwest::header::CACHE_CONTROL, "no-cache".parse().unwrap());
    headers.insert(reqwest::header::USER_AGENT, USER_AGENT.parse().unwrap());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_fails_without_dispatching() {
        let fetcher = Fetcher::with_default_timeout();
        let resp = fetcher.fetch("", "a", false).await;
        assert!(!resp.is_success());
        assert_eq!(resp.error.as_deref(), Some("empty URL"));
        assert!(resp.bytes.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let fetcher = Fetcher::new(Duration::from_millis(200));
        let resp = fetcher.fetch("http://127.0.0.1:1", "a", false).await;
        assert!(!resp.is_success());
        assert!(resp.error.is_some());
    }
}
