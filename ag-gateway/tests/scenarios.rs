use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ag_cache::{Cache, InProcessStore};
use ag_fetcher::Fetcher;
use ag_gateway::{GatewayError, Orchestrator, RequestContext};
use ag_rate_limit::RateLimiter;
use ag_store::{pool, Store};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_orchestrator(rate_limit: u64) -> (Orchestrator, Store) {
    let db = pool::connect(":memory:").await.unwrap();
    let store = Store::new(db);
    let cache = Cache::new(Arc::new(InProcessStore::new()), false);
    let rate_limiter = Arc::new(RateLimiter::new(rate_limit, Duration::from_secs(1)));
    let fetcher = Fetcher::with_default_timeout();
    (Orchestrator::new(store.clone(), cache, rate_limiter, fetcher), store)
}

async fn seed_source(store: &Store, endpoint_path: &str, source_name: &str, base_url: &str) -> (i64, i64) {
    let category = store.categories.create("anime", true).await.unwrap();
    let endpoint = store.endpoints.create(category.id, endpoint_path).await.unwrap();
    let source = store.sources.create(endpoint.id, source_name, base_url, 0, true, true).await.unwrap();
    (endpoint.id, source.id)
}

fn ctx(endpoint_path: &str, category: &str, params: &[(&str, &str)]) -> RequestContext {
    let params: BTreeMap<String, String> = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    RequestContext::new(endpoint_path, category, params)
}

#[tokio::test]
async fn scenario_1_search_single_success() {
    let server = MockServer::start().await;
    let body = r#"{"confidence_score":0.9,"message":"ok","source":"a","data":[{"judul":"Naruto","url":"https://ex/n","anime_slug":"naruto","cover":"https://ex/n.jpg","status":"","tipe":"","skor":"","penonton":"","sinopsis":"","genre":[]}]}"#;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let (orchestrator, store) = test_orchestrator(100).await;
    seed_source(&store, "/api/v1/search", "a", &server.uri()).await;

    let response = orchestrator.process(ctx("/api/v1/search", "anime", &[("q", "naruto"), ("category", "anime")])).await.unwrap();

    assert_eq!(response.source, "a");
    assert!(!response.from_cache);
    assert_eq!(response.bytes.as_ref(), body.as_bytes());
}

#[tokio::test]
async fn scenario_2_home_two_source_aggregation() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;
    let item_x = r#"{"judul":"X","url":"https://ex/x","anime_slug":"x","cover":"https://ex/x.jpg"}"#;
    let item_y = r#"{"judul":"Y","url":"https://ex/y","anime_slug":"y","cover":"https://ex/y.jpg"}"#;
    let body_a = format!(
        r#"{{"confidence_score":0.9,"top10":[{item_x}],"new_eps":[{item_x}],"movies":[{item_x}],"jadwal_rilis":{{"monday":[]}}}}"#
    );
    let body_b = format!(
        r#"{{"confidence_score":0.9,"top10":[{item_y}],"new_eps":[{item_y}],"movies":[{item_y}],"jadwal_rilis":{{"tuesday":[]}}}}"#
    );
    Mock::given(method("GET")).and(path("/api/v1/home")).respond_with(ResponseTemplate::new(200).set_body_string(body_a.clone())).mount(&server_a).await;
    Mock::given(method("GET")).and(path("/api/v1/home")).respond_with(ResponseTemplate::new(200).set_body_string(body_b.clone())).mount(&server_b).await;

    let (orchestrator, store) = test_orchestrator(100).await;
    let category = store.categories.create("anime", true).await.unwrap();
    let endpoint = store.endpoints.create(category.id, "/api/v1/home").await.unwrap();
    store.sources.create(endpoint.id, "a", &server_a.uri(), 0, true, true).await.unwrap();
    store.sources.create(endpoint.id, "b", &server_b.uri(), 1, true, true).await.unwrap();

    let response = orchestrator.process(ctx("/api/v1/home", "anime", &[])).await.unwrap();

    assert_eq!(response.source, "aggregated");
    let value: serde_json::Value = serde_json::from_slice(&response.bytes).unwrap();
    assert_eq!(value["top10"].as_array().unwrap().len(), 2);
    assert_eq!(response.attempted_sources.len(), 2);
}

#[tokio::test]
async fn scenario_3_detail_bruteforce_mirror_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/api/v1/anime-detail")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

    let mirror_server = MockServer::start().await;
    let detail_body = r#"{"confidence_score":0.9,"judul":"Naruto","url":"https://ex/naruto","anime_slug":"naruto","cover":"https://ex/n.jpg"}"#;
    Mock::given(method("GET"))
        .and(path("/api/v1/anime-detail"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_body))
        .mount(&mirror_server)
        .await;

    let (orchestrator, store) = test_orchestrator(100).await;
    let (_endpoint_id, source_id) = seed_source(&store, "/api/v1/anime-detail", "a", &server.uri()).await;
    store.mirrors.create(source_id, &mirror_server.uri(), 0, true).await.unwrap();

    let response = orchestrator.process(ctx("/api/v1/anime-detail", "anime", &[("id", "naruto")])).await.unwrap();

    assert!(response.source.contains("mirror"));
    assert_eq!(response.bytes.as_ref(), detail_body.as_bytes());
}

#[tokio::test]
async fn scenario_4_missing_identifier_returns_400_before_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/api/v1/anime-detail")).respond_with(ResponseTemplate::new(200).set_body_string("{}")).mount(&server).await;

    let (orchestrator, store) = test_orchestrator(100).await;
    seed_source(&store, "/api/v1/anime-detail", "a", &server.uri()).await;

    let err = orchestrator.process(ctx("/api/v1/anime-detail", "anime", &[])).await.unwrap_err();

    assert!(matches!(err, GatewayError::MissingIdentifier(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn scenario_5_all_sources_fail_returns_503() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/api/v1/home")).respond_with(ResponseTemplate::new(200).set_body_string("")).mount(&server).await;

    let (orchestrator, store) = test_orchestrator(100).await;
    seed_source(&store, "/api/v1/home", "a", &server.uri()).await;

    let err = orchestrator.process(ctx("/api/v1/home", "anime", &[])).await.unwrap_err();

    assert!(matches!(err, GatewayError::AllSourcesFailed(ref ep) if ep == "/api/v1/home"));
}

#[tokio::test]
async fn scenario_6_rate_limit_rejects_before_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/api/v1/home")).respond_with(ResponseTemplate::new(200).set_body_string("{}")).mount(&server).await;

    let (orchestrator, store) = test_orchestrator(0).await;
    seed_source(&store, "/api/v1/home", "a", &server.uri()).await;

    let err = orchestrator.process(ctx("/api/v1/home", "anime", &[])).await.unwrap_err();

    assert!(matches!(err, GatewayError::RateLimited));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn cross_category_request_is_served_from_cache_on_second_call() {
    let server = MockServer::start().await;
    let body = r#"{"confidence_score":0.9,"data":[{"judul":"X","url":"https://ex/x","anime_slug":"x","cover":"https://ex/x.jpg"}]}"#;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let (orchestrator, store) = test_orchestrator(100).await;
    seed_source(&store, "/api/v1/search", "a", &server.uri()).await;

    let first = orchestrator.process(ctx("/api/v1/search", "all", &[("q", "x")])).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.source, "cross-category");

    let second = orchestrator.process(ctx("/api/v1/search", "all", &[("q", "x")])).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.bytes, first.bytes);
}

#[tokio::test]
async fn cross_category_aggregates_per_category_when_multiple_sources_succeed() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;
    let item_x = r#"{"judul":"X","url":"https://ex/x","anime_slug":"x","cover":"https://ex/x.jpg"}"#;
    let item_y = r#"{"judul":"Y","url":"https://ex/y","anime_slug":"y","cover":"https://ex/y.jpg"}"#;
    let body_a = format!(r#"{{"confidence_score":0.9,"data":[{item_x}]}}"#);
    let body_b = format!(r#"{{"confidence_score":0.9,"data":[{item_y}]}}"#);
    Mock::given(method("GET")).and(path("/api/v1/search")).respond_with(ResponseTemplate::new(200).set_body_string(body_a)).mount(&server_a).await;
    Mock::given(method("GET")).and(path("/api/v1/search")).respond_with(ResponseTemplate::new(200).set_body_string(body_b)).mount(&server_b).await;

    let (orchestrator, store) = test_orchestrator(100).await;
    let category = store.categories.create("anime", true).await.unwrap();
    let endpoint = store.endpoints.create(category.id, "/api/v1/search").await.unwrap();
    store.sources.create(endpoint.id, "a", &server_a.uri(), 0, true, true).await.unwrap();
    store.sources.create(endpoint.id, "b", &server_b.uri(), 1, true, true).await.unwrap();

    let response = orchestrator.process(ctx("/api/v1/search", "all", &[("q", "x")])).await.unwrap();

    let value: serde_json::Value = serde_json::from_slice(&response.bytes).unwrap();
    let merged = &value["data_by_category"]["anime"]["data"];
    assert_eq!(merged.as_array().unwrap().len(), 2);
    assert_eq!(response.attempted_sources.len(), 2);
}

#[tokio::test]
async fn cache_hit_on_second_request_within_ttl() {
    let server = MockServer::start().await;
    let body = r#"{"confidence_score":0.9,"data":[{"judul":"X","url":"https://ex/x","anime_slug":"x","cover":"https://ex/x.jpg"}]}"#;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let (orchestrator, store) = test_orchestrator(100).await;
    seed_source(&store, "/api/v1/search", "a", &server.uri()).await;

    let first = orchestrator.process(ctx("/api/v1/search", "anime", &[("q", "x")])).await.unwrap();
    assert!(!first.from_cache);

    let second = orchestrator.process(ctx("/api/v1/search", "anime", &[("q", "x")])).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.bytes, first.bytes);
}
