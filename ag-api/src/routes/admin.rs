use ag_core::AppError;
use ag_store::{Mirror, Source};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;

/// Thin CRUD adapter over the same store the orchestrator reads (spec §1's
/// "configuration admin surface ... a thin adapter around the ... store").
/// Grounded on the reference framework's resource-controller shape
/// (list/get/create/update/delete per entity), hand-wired since the DI
/// controller macro is out of scope (see `DESIGN.md`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/categories", get(list_categories).post(create_category))
        .route("/admin/categories/{id}", put(update_category).delete(delete_category))
        .route("/admin/categories/{category_id}/endpoints", get(list_endpoints).post(create_endpoint))
        .route("/admin/endpoints/{id}", delete(delete_endpoint))
        .route("/admin/endpoints/{endpoint_id}/sources", get(list_sources).post(create_source))
        .route("/admin/endpoints/{endpoint_id}/sources/bulk", post(bulk_create_sources))
        .route("/admin/sources/{id}", put(update_source).delete(delete_source))
        .route("/admin/sources/{source_id}/mirrors", get(list_mirrors).post(create_mirror))
        .route("/admin/mirrors/{id}", delete(delete_mirror))
        .route("/admin/health/{endpoint_id}", get(health_status))
        .route("/admin/health/check", post(manual_health_check))
}

#[derive(Deserialize)]
struct CreateCategory {
    name: String,
    #[serde(default = "default_true")]
    active: bool,
}

#[derive(Deserialize)]
struct UpdateCategory {
    name: String,
    active: bool,
}

#[derive(Deserialize)]
struct CreateEndpoint {
    path: String,
}

#[derive(Deserialize)]
struct CreateSource {
    name: String,
    base_url: String,
    #[serde(default)]
    priority: i64,
    #[serde(default = "default_true")]
    is_primary: bool,
    #[serde(default = "default_true")]
    active: bool,
}

#[derive(Deserialize)]
struct BulkCreateSources {
    sources: Vec<CreateSource>,
}

#[derive(Deserialize)]
struct CreateMirror {
    mirror_url: String,
    #[serde(default)]
    priority: i64,
    #[serde(default = "default_true")]
    active: bool,
}

fn default_true() -> bool {
    true
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<ag_store::Category>>, AppError> {
    let categories = state.store.categories.find_all().await?;
    Ok(Json(categories))
}

async fn create_category(State(state): State<AppState>, Json(body): Json<CreateCategory>) -> Result<(StatusCode, Json<ag_store::Category>), AppError> {
    let category = state.store.categories.create(&body.name, body.active).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(State(state): State<AppState>, Path(id): Path<i64>, Json(body): Json<UpdateCategory>) -> Result<Json<ag_store::Category>, AppError> {
    let category = state.store.categories.update(id, &body.name, body.active).await?;
    Ok(Json(category))
}

async fn delete_category(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.store.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_endpoints(State(state): State<AppState>, Path(category_id): Path<i64>) -> Result<Json<Vec<ag_store::Endpoint>>, AppError> {
    let endpoints = state.store.endpoints.find_by_category(category_id).await?;
    Ok(Json(endpoints))
}

async fn create_endpoint(State(state): State<AppState>, Path(category_id): Path<i64>, Json(body): Json<CreateEndpoint>) -> Result<(StatusCode, Json<ag_store::Endpoint>), AppError> {
    let endpoint = state.store.endpoints.create(category_id, &body.path).await?;
    Ok((StatusCode::CREATED, Json(endpoint)))
}

async fn delete_endpoint(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.store.endpoints.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_sources(State(state): State<AppState>, Path(endpoint_id): Path<i64>) -> Result<Json<Vec<Source>>, AppError> {
    let sources = state.store.sources.find_all_by_endpoint(endpoint_id).await?;
    Ok(Json(sources))
}

async fn create_source(State(state): State<AppState>, Path(endpoint_id): Path<i64>, Json(body): Json<CreateSource>) -> Result<(StatusCode, Json<Source>), AppError> {
    let source = state
        .store
        .sources
        .create(endpoint_id, &body.name, &body.base_url, body.priority, body.is_primary, body.active)
        .await?;
    Ok((StatusCode::CREATED, Json(source)))
}

/// Bulk source creation across every endpoint of a category (spec §3's
/// "may be created in bulk for every endpoint of a category").
async fn bulk_create_sources(State(state): State<AppState>, Path(endpoint_id): Path<i64>, Json(body): Json<BulkCreateSources>) -> Result<(StatusCode, Json<Vec<Source>>), AppError> {
    let mut created = Vec::with_capacity(body.sources.len());
    for decl in body.sources {
        let source = state
            .store
            .sources
            .create(endpoint_id, &decl.name, &decl.base_url, decl.priority, decl.is_primary, decl.active)
            .await?;
        created.push(source);
    }
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_source(State(state): State<AppState>, Path(id): Path<i64>, Json(body): Json<CreateSource>) -> Result<Json<Source>, AppError> {
    let existing = state.store.sources.find_by_id(id).await?.ok_or_else(|| AppError::NotFound(format!("source {id}")))?;
    let updated = Source { name: body.name, base_url: body.base_url, priority: body.priority, is_primary: body.is_primary, active: body.active, ..existing };
    let saved = state.store.sources.update(&updated).await?;
    Ok(Json(saved))
}

async fn delete_source(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.store.sources.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_mirrors(State(state): State<AppState>, Path(source_id): Path<i64>) -> Result<Json<Vec<Mirror>>, AppError> {
    let mirrors = state.store.mirrors.find_active_by_source(source_id).await?;
    Ok(Json(mirrors))
}

async fn create_mirror(State(state): State<AppState>, Path(source_id): Path<i64>, Json(body): Json<CreateMirror>) -> Result<(StatusCode, Json<Mirror>), AppError> {
    let mirror = state.store.mirrors.create(source_id, &body.mirror_url, body.priority, body.active).await?;
    Ok((StatusCode::CREATED, Json(mirror)))
}

async fn delete_mirror(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.store.mirrors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health_status(State(state): State<AppState>, Path(endpoint_id): Path<i64>) -> Json<Vec<ag_store::SourceHealth>> {
    Json(ag_gateway::prober::get_health_status(&state.store, endpoint_id).await)
}

async fn manual_health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let report = ag_gateway::prober::run_manual_health_check(&state.store, &state.fetcher).await;
    let results: Vec<_> = report
        .results
        .iter()
        .map(|r| {
            serde_json::json!({
                "source_id": r.source_id,
                "source_name": r.source_name,
                "endpoint_id": r.endpoint_id,
                "status": r.status,
                "elapsed_ms": r.elapsed_ms,
            })
        })
        .collect();
    Json(serde_json::json!({
        "results": results,
        "checked": report.tally.checked,
        "healthy": report.tally.healthy,
        "unhealthy": report.tally.unhealthy,
        "health_percentage": report.tally.health_percentage,
    }))
}
