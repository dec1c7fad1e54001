//! Router configuration module
//!
//! Configures all routes, middleware layers, and creates the application router.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, image, photo_uploaded, process_tasks, ready, webhook};
use crate::state::AppState;

/// Create the application router with all routes and middleware layers.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // The gateway serves images cross-origin; everything else is
    // infrastructure-facing.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let body_limit = RequestBodyLimitLayer::new(config.body_limit_mb * 1024 * 1024);

    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.timeout_secs),
    );

    let router = Router::new()
        .route("/image", get(image))
        .route("/bot/webhook", post(webhook))
        .route("/hooks/photo-uploaded", post(photo_uploaded))
        .route("/hooks/process-tasks", post(process_tasks))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .layer(cors)
        .layer(body_limit)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Conditionally apply rate limiting (disabled in tests, enabled in production)
    if config.rate_limit_enabled {
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_sec)
            .burst_size(config.rate_limit_burst)
            .finish()
            .expect("Failed to build rate limiter config");

        tracing::info!(
            "Rate limiting: {} req/s (burst: {})",
            config.rate_limit_per_sec,
            config.rate_limit_burst
        );

        router.layer(GovernorLayer::new(Arc::new(governor_conf)))
    } else {
        router
    }
}
