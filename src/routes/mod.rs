// HTTP routes

mod error;
mod http;

pub use error::ApiError;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{AppConfig, CorsConfig};
use crate::sysinfo_repo::SysinfoRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sysinfo_repo: Arc<SysinfoRepo>,
}

pub fn app(sysinfo_repo: Arc<SysinfoRepo>, config: &AppConfig) -> Router {
    let state = AppState { sysinfo_repo };
    Router::new()
        .route("/stats", get(http::stats_handler)) // GET /stats
        .route("/kill/{pid}", post(http::kill_handler)) // POST /kill/{pid}
        .route("/version", get(http::version_handler)) // GET /version
        .layer(cors_layer(&config.cors))
        .with_state(state)
}

/// The dashboard is served from another origin and issues POSTs, so preflights must pass.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins = if cors.allows_any() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
