use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ag_api_test_support::*;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn with_connect_info(mut request: Request<Body>) -> Request<Body> {
    let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test]
async fn health_route_reports_up() {
    let (router, _store) = test_app(10).await;

    let response = router.oneshot(with_connect_info(Request::builder().uri("/health").body(Body::empty()).unwrap())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "UP");
}

#[tokio::test]
async fn search_route_fetches_through_orchestrator_and_sets_headers() {
    let upstream = MockServer::start().await;
    let payload = json!({
        "data": [{ "judul": "Kaiju No. 8", "url": "https://a/anime/kaiju", "anime_slug": "kaiju-no-8", "cover": "https://a/cover.jpg" }]
    });
    Mock::given(method("GET")).and(path("/api/v1/search")).respond_with(ResponseTemplate::new(200).set_body_json(&payload)).mount(&upstream).await;

    let (router, store) = test_app(10).await;
    seed_source(&store, "/api/v1/search", "gomunime", &upstream.uri()).await;

    let request = with_connect_info(
        Request::builder().uri("/api/v1/search?query=kaiju").header("user-agent", "integration-test").body(Body::empty()).unwrap(),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let source_header = response.headers().get("x-source").unwrap().to_str().unwrap().to_string();
    assert_eq!(source_header, "gomunime");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["data"][0]["anime_slug"], "kaiju-no-8");
}

#[tokio::test]
async fn rate_limited_request_returns_429_with_gateway_error_body() {
    let (router, _store) = test_app(0).await;

    let response = router.oneshot(with_connect_info(Request::builder().uri("/api/v1/home").body(Body::empty()).unwrap())).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["error"], true);
}

#[tokio::test]
async fn admin_category_crud_round_trips_through_the_router() {
    let (router, _store) = test_app(10).await;

    let create = Request::builder()
        .method("POST")
        .uri("/admin/categories")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "anime", "active": true}).to_string()))
        .unwrap();
    let response = router.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let created: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(created["name"], "anime");

    let list = router.oneshot(Request::builder().uri("/admin/categories").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    let body = to_bytes(list.into_body(), usize::MAX).await.unwrap();
    let categories: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(categories.as_array().unwrap().len(), 1);
}

/// Test-only helpers shared by this file, mirroring the crate's own `tests/`
/// layout rather than introducing a second support crate.
mod ag_api_test_support {
    use super::*;
    use ag_api::routes;
    use ag_api::state::AppState;
    use ag_cache::{Cache, InProcessStore};
    use ag_fetcher::Fetcher;
    use ag_gateway::Orchestrator;
    use ag_rate_limit::RateLimiter;
    use ag_scheduler::SchedulerHandle;
    use ag_store::{pool, Store};
    use axum::Router;

    pub async fn test_app(rate_limit: u64) -> (Router, Store) {
        let db_pool = pool::connect(":memory:").await.unwrap();
        let store = Store::new(db_pool);
        let cache = Cache::new(Arc::new(InProcessStore::new()), false);
        let rate_limiter = Arc::new(RateLimiter::new(rate_limit, Duration::from_secs(1)));
        let fetcher = Fetcher::with_default_timeout();
        let orchestrator = Orchestrator::new(store.clone(), cache, rate_limiter, fetcher.clone());
        let scheduler = Arc::new(SchedulerHandle::new());

        let state = AppState { orchestrator, store: store.clone(), scheduler, fetcher };
        let router = routes::router().with_state(state);
        (router, store)
    }

    pub async fn seed_source(store: &Store, endpoint_path: &str, source_name: &str, base_url: &str) {
        let category = store.categories.create("anime", true).await.unwrap();
        let endpoint = store.endpoints.create(category.id, endpoint_path).await.unwrap();
        store.sources.create(endpoint.id, source_name, base_url, 0, true, true).await.unwrap();
    }
}
