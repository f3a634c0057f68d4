//! HTTP transport implementation.
//!
//! Exposes the read operation as `GET {read_path}?path=<relative path>` with
//! HTTP Basic credentials. Successful reads return the raw file bytes; every
//! failure returns a JSON body of the form `{"error": "<message>"}`.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::FileApi;
use crate::core::error::ReadError;
use crate::core::security::Credentials;

/// Realm advertised in `WWW-Authenticate` challenges.
const AUTH_REALM: &str = "Basic realm=\"data-file-api\"";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Query string of the read endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadFileQuery {
    /// Relative path of the file, e.g. `data/config.yaml`.
    #[serde(default)]
    pub path: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, api: FileApi) -> TransportResult<()> {
        let addr = self.address();
        let app = router(api, &self.config)?;

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Read:   GET {}?path=data/...", self.config.read_path);
        info!("  → Health: GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the router serving `api` according to `config`.
pub fn router(api: FileApi, config: &HttpConfig) -> TransportResult<Router> {
    validate_read_route(&config.read_path)?;

    let mut app = Router::new()
        .route(&config.read_path, get(read_file_handler))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(api)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    Ok(app)
}

/// Routes owned by the server itself.
const RESERVED_ROUTES: &[&str] = &["/", "/health"];

/// Rejects read routes that would collide with another route or that axum
/// would parse as a capture or wildcard.
fn validate_read_route(route: &str) -> TransportResult<()> {
    let is_literal = route.starts_with('/')
        && !route.contains(['{', '}', '*'])
        && !route.split('/').any(|segment| segment.starts_with(':'));

    if !is_literal || RESERVED_ROUTES.contains(&route) {
        return Err(TransportError::InvalidRoute(route.to_string()));
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Root handler - provides API info.
async fn root_handler(State(api): State<FileApi>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": api.name(),
        "version": api.version(),
        "transport": "HTTP",
        "endpoints": {
            "read": api.config().http.read_path,
            "health": "/health"
        },
        "authentication": "Basic"
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle a file read request.
///
/// A malformed query string is treated as a missing path, which is only
/// reported once the caller has authenticated.
#[instrument(skip_all)]
async fn read_file_handler(
    State(api): State<FileApi>,
    headers: HeaderMap,
    query: Result<Query<ReadFileQuery>, QueryRejection>,
) -> Response {
    let credentials = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(Credentials::from_basic_auth);

    let query = query.map(|Query(q)| q).unwrap_or_default();

    match api.read_file(credentials.as_ref(), query.path.as_deref()).await {
        Ok(contents) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            Bytes::from(contents),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Convert a read failure into its HTTP response.
pub fn error_response(err: ReadError) -> Response {
    let status = status_code(&err);
    let message = match &err {
        ReadError::IoFailure(_) => "Internal server error".to_string(),
        other => other.to_string(),
    };

    let mut response = (status, Json(serde_json::json!({ "error": message }))).into_response();

    if err == ReadError::Unauthorized {
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(AUTH_REALM),
        );
    }

    response
}

/// Status code for each failure kind.
pub fn status_code(err: &ReadError) -> StatusCode {
    match err {
        ReadError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        ReadError::Unauthorized => StatusCode::UNAUTHORIZED,
        ReadError::NotFound(_) => StatusCode::NOT_FOUND,
        ReadError::AccessDenied(_) => StatusCode::FORBIDDEN,
        ReadError::IoFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
