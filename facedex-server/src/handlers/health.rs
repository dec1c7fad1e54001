//! Health check handlers
//!
//! Provides health and readiness endpoints for monitoring and orchestration.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    pub status: &'static str,
    /// Server version from Cargo.toml
    pub version: &'static str,
    /// Service name
    pub service: &'static str,
    /// Whether the face store answered the connectivity check
    pub database_ok: bool,
    /// Faces still waiting for a name, when the store is reachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unnamed_faces: Option<i64>,
}

/// GET /health - Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = state.faces.check_health().await.is_ok();
    let unnamed_faces = if database_ok {
        state.faces.count_unnamed().await.ok()
    } else {
        None
    };

    Json(HealthResponse {
        status: if database_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        service: "facedex-server",
        database_ok,
        unnamed_faces,
    })
}

/// Readiness response for orchestration probes
#[derive(Serialize)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
}

/// GET /ready - readiness probe, a simple yes/no check
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}
