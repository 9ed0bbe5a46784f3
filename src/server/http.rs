//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Request bodies are
//! collected here so route handlers work on plain bytes.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::routes::response::{error_response, json_response};
use crate::services::ComplaintDesk;
use crate::types::{KavachError, Result};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest accepted request body. Evidence travels as file names only.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How long shutdown waits for in-flight requests
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const COMPLAINTS_PREFIX: &str = "/api/complaints/";
const UPDATE_STATUS_PREFIX: &str = "/api/complaints/update-status/";

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub desk: ComplaintDesk,
    /// Present when complaints are stored in MongoDB
    pub mongo: Option<MongoClient>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, desk: ComplaintDesk, mongo: Option<MongoClient>) -> Self {
        Self {
            args,
            desk,
            mongo,
            started_at: Instant::now(),
        }
    }
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.args.listen_addr();
    let listener = TcpListener::bind(addr).await?;

    info!("Nyaya Kavach listening on {}", addr);

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    serve(listener, state, shutdown_signal()).await
}

/// Accept connections on `listener` until `shutdown` resolves, then wait for
/// in-flight requests to finish (bounded by `SHUTDOWN_GRACE`)
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    info!(
        "Complaint store: {}",
        state.desk.store().backend()
    );

    let graceful = GracefulShutdown::new();

    loop {
        let accepted = tokio::select! {
            _ = &mut shutdown => {
                info!("Server shutting down");
                break;
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                let io = TokioIo::new(stream);

                let state = Arc::clone(&state);
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { handle_request(state, addr, req).await }
                });

                let conn = http1::Builder::new().serve_connection(io, service);
                let conn = graceful.watch(conn);

                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        debug!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }

    drop(listener);

    tokio::select! {
        _ = graceful.shutdown() => {
            debug!("All connections closed");
        }
        _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
            warn!("Connections still open after {:?}, closing anyway", SHUTDOWN_GRACE);
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    info!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(to_boxed(preflight_response()));
    }

    let desk = &state.desk;

    let response = match (method, path.as_str()) {
        (Method::GET, "/") => routes::root_banner(),

        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(Arc::clone(&state))
        }

        (Method::GET, "/version") => routes::version_info(),

        (Method::GET, "/api/complaints/track") => {
            routes::handle_track(desk, query.as_deref()).await
        }

        (Method::POST, "/api/complaints") => match read_body(req).await {
            Ok(body) => routes::handle_create(desk, body).await,
            Err(response) => response,
        },

        (Method::POST, "/chatbot") => match read_body(req).await {
            Ok(body) => routes::handle_chatbot(body).await,
            Err(response) => response,
        },

        (Method::PATCH, p) if status_route_case_id(p).is_some() => {
            let segment = status_route_case_id(p).unwrap_or_default();
            match decode_segment(segment) {
                Ok(case_id) => match read_body(req).await {
                    Ok(body) => routes::handle_append_status(desk, &case_id, body).await,
                    Err(response) => response,
                },
                Err(e) => error_response(&e, "Invalid case id"),
            }
        }

        (Method::PUT, p) if update_route_case_id(p).is_some() => {
            let segment = update_route_case_id(p).unwrap_or_default();
            match decode_segment(segment) {
                Ok(case_id) => match read_body(req).await {
                    Ok(body) => routes::handle_update_status(desk, &case_id, body).await,
                    Err(response) => response,
                },
                Err(e) => error_response(&e, "Invalid case id"),
            }
        }

        _ => not_found_response(&path),
    };

    Ok(to_boxed(response))
}

/// `/api/complaints/{caseId}/status`
fn status_route_case_id(path: &str) -> Option<&str> {
    path.strip_prefix(COMPLAINTS_PREFIX)
        .and_then(|rest| rest.strip_suffix("/status"))
        .filter(|id| is_path_segment(id))
}

/// `/api/complaints/update-status/{caseId}`
fn update_route_case_id(path: &str) -> Option<&str> {
    path.strip_prefix(UPDATE_STATUS_PREFIX)
        .filter(|id| is_path_segment(id))
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

/// Percent-decode a path segment
fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| KavachError::BadRequest(format!("Invalid path segment '{}': {}", segment, e)))
}

/// Collect a request body, answering oversized or broken bodies directly
async fn read_body(req: Request<Incoming>) -> std::result::Result<Bytes, Response<Full<Bytes>>> {
    match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(json_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &serde_json::json!({ "error": "Request body too large" }),
        )),
        Err(e) => Err(error_response(
            &KavachError::BadRequest(format!("Failed to read request body: {}", e)),
            "Failed to read request body",
        )),
    }
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        hyper::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        hyper::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        hyper::header::HeaderValue::from_static("GET, POST, PATCH, PUT, OPTIONS"),
    );
    response
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}
