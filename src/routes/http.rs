// Handlers: stats, kill, version

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use super::{AppState, ApiError};
use crate::models::{KillResponse, KillResult, SystemSnapshot};

/// Package name and version, from Cargo.toml at build time.
const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /stats — fresh CPU/memory totals and process list, sorted by CPU descending.
pub(super) async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<SystemSnapshot>, ApiError> {
    let snapshot = state.sysinfo_repo.collect().await.map_err(|e| {
        tracing::error!("Stats collection failed: {}", e);
        ApiError::Collect(e.to_string())
    })?;
    Ok(Json(snapshot))
}

/// POST /kill/{pid} — SIGKILL one process; 404 / 403 / 500 distinguish the failures.
pub(super) async fn kill_handler(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<KillResponse>, ApiError> {
    let pid = parse_pid(&pid)?;
    let result = state.sysinfo_repo.terminate(pid).await.map_err(|e| {
        tracing::error!("Kill task failed for PID {}: {}", pid, e);
        ApiError::KillFailed(e.to_string())
    })?;
    match result {
        KillResult::Terminated(pid) => Ok(Json(KillResponse::terminated(pid))),
        KillResult::NotFound => Err(ApiError::NotFound),
        KillResult::Forbidden => Err(ApiError::Forbidden),
        KillResult::Failed(detail) => Err(ApiError::KillFailed(detail)),
    }
}

/// GET /version — service name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// Digits only; rejects signs, whitespace and anything beyond u32.
fn parse_pid(raw: &str) -> Result<u32, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidPid);
    }
    raw.parse().map_err(|_| ApiError::InvalidPid)
}
