use std::collections::BTreeMap;
use std::net::SocketAddr;

use ag_gateway::{GatewayError, RequestContext};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Every client-facing route (spec §6's table), each with its trailing
/// slash variant. `/api/v1/jadwal-rilis/{day}` additionally takes a path
/// segment that is forwarded as part of the outbound path.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/home", get(home))
        .route("/api/v1/home/", get(home))
        .route("/api/v1/jadwal-rilis", get(jadwal_rilis))
        .route("/api/v1/jadwal-rilis/", get(jadwal_rilis))
        .route("/api/v1/jadwal-rilis/{day}", get(jadwal_rilis_day))
        .route("/api/v1/jadwal-rilis/{day}/", get(jadwal_rilis_day))
        .route("/api/v1/anime-terbaru", get(anime_terbaru))
        .route("/api/v1/anime-terbaru/", get(anime_terbaru))
        .route("/api/v1/movie", get(movie))
        .route("/api/v1/movie/", get(movie))
        .route("/api/v1/anime-detail", get(anime_detail))
        .route("/api/v1/anime-detail/", get(anime_detail))
        .route("/api/v1/episode-detail", get(episode_detail))
        .route("/api/v1/episode-detail/", get(episode_detail))
        .route("/api/v1/search", get(search))
        .route("/api/v1/search/", get(search))
}

async fn home(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/home", query.0).await
}

async fn jadwal_rilis(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/jadwal-rilis", query.0).await
}

async fn jadwal_rilis_day(
    state: State<AppState>,
    conn: ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(day): Path<String>,
    query: Query<BTreeMap<String, String>>,
) -> Response {
    let endpoint_path = format!("/api/v1/jadwal-rilis/{day}");
    dispatch(state, conn, headers, &endpoint_path, query.0).await
}

async fn anime_terbaru(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/anime-terbaru", query.0).await
}

async fn movie(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/movie", query.0).await
}

async fn anime_detail(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/anime-detail", query.0).await
}

async fn episode_detail(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/episode-detail", query.0).await
}

async fn search(state: State<AppState>, conn: ConnectInfo<SocketAddr>, headers: HeaderMap, query: Query<BTreeMap<String, String>>) -> Response {
    dispatch(state, conn, headers, "/api/v1/search", query.0).await
}

/// Shared request path (spec §6): pull `category` (default `anime`),
/// build a `RequestContext` carrying the caller's address and user agent,
/// run the orchestrator, and translate the result into an HTTP response
/// with its metadata headers.
async fn dispatch(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    endpoint_path: &str,
    mut params: BTreeMap<String, String>,
) -> Response {
    let category = params.remove("category").unwrap_or_else(|| "anime".to_string());
    params.insert("category".to_string(), category.clone());

    let user_agent = headers.get(axum::http::header::USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string);
    let ctx = RequestContext::new(endpoint_path, category.clone(), params).with_client(Some(addr.to_string()), user_agent);

    match state.orchestrator.process(ctx).await {
        Ok(response) => orchestrated_response(endpoint_path, &category, response),
        Err(err) => gateway_error_response(err),
    }
}

fn orchestrated_response(endpoint_path: &str, category: &str, response: ag_gateway::OrchestratedResponse) -> Response {
    let mut http_response = (StatusCode::OK, response.bytes.clone()).into_response();
    let headers = http_response.headers_mut();

    headers.insert("content-type", HeaderValue::from_static("application/json"));
    insert_header(headers, "x-source", &response.source);
    insert_header(headers, "x-response-time", &format!("{}ms", response.response_time.as_millis()));
    insert_header(headers, "x-cache", if response.from_cache { "HIT" } else { "MISS" });
    insert_header(headers, "x-category", category);
    insert_header(headers, "x-endpoint", endpoint_path);
    insert_header(headers, "x-total-time", &format!("{}ms", response.response_time.as_millis()));
    insert_header(headers, "x-attempts", &response.total_attempts.to_string());
    if !response.attempted_sources.is_empty() {
        insert_header(headers, "x-all-sources", &response.attempted_sources.join(","));
    }

    http_response
}

fn insert_header(headers: &mut axum::http::HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

fn gateway_error_response(err: GatewayError) -> Response {
    err.into_response()
}
