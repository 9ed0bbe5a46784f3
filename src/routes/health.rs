//! Health check endpoints
//!
//! Kubernetes-style probes:
//! - /health, /healthz - Liveness probe (is the service running?)
//! - /ready, /readyz - Readiness probe (can complaints be stored durably?)
//!
//! Readiness requires the MongoDB store, unless dev_mode is enabled, where the
//! in-memory fallback counts as ready.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::response::{json_response, text_response};
use crate::server::AppState;

const BANNER: &str = "Nyaya Kavach backend is running!";

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// 'online' or 'degraded'
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime: u64,
    pub timestamp: String,
    pub mode: &'static str,
    pub storage: StorageHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct StorageHealth {
    pub backend: &'static str,
    pub durable: bool,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let backend = state.desk.store().backend();
    let durable = state.mongo.is_some();

    let error = if durable {
        None
    } else if state.args.dev_mode {
        Some("Dev mode: complaints are held in memory and lost on restart".to_string())
    } else {
        Some("No durable complaint store configured".to_string())
    };

    HealthResponse {
        healthy: true,
        status: if durable || state.args.dev_mode {
            "online"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        storage: StorageHealth { backend, durable },
        error,
    }
}

/// Liveness probe: always 200 while the process serves requests
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(&state))
}

/// Readiness probe
pub fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state);
    let is_ready = response.storage.durable || state.args.dev_mode;

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    json_response(status, &response)
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "nyaya-kavach",
    };

    json_response(StatusCode::OK, &response)
}

/// `GET /` banner
pub fn root_banner() -> Response<Full<Bytes>> {
    text_response(StatusCode::OK, BANNER)
}
