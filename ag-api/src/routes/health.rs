use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

/// `GET /health` (spec §6): a single liveness check. Readiness against the
/// store is folded in, since an unreachable store means the gateway cannot
/// serve anything meaningful anyway.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health)).route("/health/", get(health))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store_up = state.store.categories.find_all().await.is_ok();
    Json(serde_json::json!({
        "status": if store_up { "UP" } else { "DOWN" },
        "store": if store_up { "UP" } else { "DOWN" },
    }))
}
