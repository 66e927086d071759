pub mod admin;
pub mod client;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// The complete HTTP surface: client-facing aggregation routes, the `/admin`
/// CRUD adapter, and the liveness check.
pub fn router() -> Router<AppState> {
    Router::new().merge(client::router()).merge(health::router()).merge(admin::router())
}
