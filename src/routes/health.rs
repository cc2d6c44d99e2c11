use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::{
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    if let Err(err) = state.db.ping().await {
        tracing::warn!(error = %err, "database health check failed");
        return JsonApiResponse::with_status(
            StatusCode::SERVICE_UNAVAILABLE,
            "degraded",
            HealthResponse {
                status: "degraded",
                database: "error",
            },
        );
    }

    JsonApiResponse::ok(HealthResponse {
        status: "ok",
        database: "ok",
    })
}
