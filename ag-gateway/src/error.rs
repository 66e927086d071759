use axum::response::{IntoResponse, Response};
use axum::Json;
use axum::http::StatusCode;

/// Client-visible error kinds (spec §7's taxonomy). `ValidationFailed` and
/// `FetchFailed` are deliberately absent: per-upstream failures never
/// propagate out of the orchestrator, so they never need a client-facing
/// representation here.
#[derive(Debug, Clone)]
pub enum GatewayError {
    RateLimited,
    MissingIdentifier(String),
    NoSources,
    AllSourcesFailed(String),
    BadRequest(String),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::MissingIdentifier(_) => StatusCode::BAD_REQUEST,
            GatewayError::NoSources => StatusCode::NOT_FOUND,
            GatewayError::AllSourcesFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            GatewayError::RateLimited => "rate limit exceeded".to_string(),
            GatewayError::MissingIdentifier(detail) => format!("missing required parameter: {detail}"),
            GatewayError::NoSources => "no active source configured for this endpoint and category".to_string(),
            GatewayError::AllSourcesFailed(endpoint_path) => format!("all API sources failed for endpoint {endpoint_path}"),
            GatewayError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for GatewayError {}

/// Client error body (spec §7 — `{error: true, message, source}`).
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": true,
            "message": self.message(),
            "source": "ag-gateway",
        }));
        (status, body).into_response()
    }
}
