//! Response builders shared by the route handlers
//!
//! Every response allows any origin; the complaint form is served from a
//! different host than the API.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::types::KavachError;

/// Build a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-store")
            .header("Access-Control-Allow-Origin", "*")
            .body(Full::new(Bytes::from(json)))
            .unwrap_or_else(|_| internal_error_response()),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            internal_error_response()
        }
    }
}

/// Build a JSON error response from a `KavachError`
///
/// Server-side failures are logged in full and answered with `fallback`.
pub fn error_response(err: &KavachError, fallback: &str) -> Response<Full<Bytes>> {
    if !err.is_client_error() {
        error!("{}: {}", fallback, err);
    }
    json_response(err.status_code(), &err.to_body(fallback))
}

/// Plain text response
pub fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|_| internal_error_response())
}

fn internal_error_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"error":"Internal error"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
