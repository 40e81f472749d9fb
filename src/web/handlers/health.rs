//! Health check handler

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::web::{responses::ok, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
    pub cached_profiles: usize,
    pub uptime_seconds: u64,
}

/// Basic liveness plus pool and cache sizes
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    ok(HealthResponse {
        status: "healthy",
        sessions: state.profile_service.pool().len(),
        cached_profiles: state.profile_service.cache().len().await,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
