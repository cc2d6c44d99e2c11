use std::sync::Arc;

use axum::{Router, http::StatusCode, middleware};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    middleware::{catch_panic_layer, json_error_middleware, request_log_middleware},
    state::AppState,
};

use super::{api, health};

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest(API_PREFIX, api::router(state.clone()))
        .merge(health::router(state))
}

/// The routes wrapped in the full middleware stack, innermost layer first.
pub fn app(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.general.request_timeout();
    router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(middleware::from_fn(request_log_middleware))
        .layer(TraceLayer::new_for_http())
}
