//! Health Check Commands
//!
//! Commands for checking the health status of both glyph backends.

use crate::models::response::HealthResponse;
use crate::state::AppState;
use crate::utils::error::AppResult;

/// Get the health status of the shared pool and local storage
pub async fn get_health(state: &AppState) -> AppResult<HealthResponse> {
    let report = state.health().await;

    // Local-only by configuration is not degraded; an unreachable pool is.
    let remote_ok = !report.remote_configured || report.remote_reachable;
    let status = if remote_ok && report.local_healthy {
        "healthy"
    } else {
        "degraded"
    };

    Ok(HealthResponse {
        status: status.to_string(),
        identity: report.identity,
        remote_configured: report.remote_configured,
        remote_reachable: report.remote_reachable,
        remote_error: report.remote_error,
        artifact_count: report.artifact_count,
        local_healthy: report.local_healthy,
        ..HealthResponse::default()
    })
}
