//! End-to-end tests for the HTTP read endpoint.
//!
//! Requests are driven through the axum router with `tower::ServiceExt::oneshot`
//! against a temporary root directory.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tower::ServiceExt;

use async_trait::async_trait;
use data_file_api::core::security::{StaticIdentityProvider, ValidatedPath};
use data_file_api::core::transport::TransportError;
use data_file_api::core::transport::http::router;
use data_file_api::core::{Config, FileApi, HttpConfig, TraversalPolicy};
use data_file_api::domains::files::{FileError, FileReader};

const FIXTURE: &[u8] = b"host: 0.0.0.0\nport: 55000\n";

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn setup_root() -> TempDir {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("data/nested")).unwrap();
    fs::write(root.path().join("data/exists.txt"), FIXTURE).unwrap();
    fs::write(root.path().join("data/nested/inner.log"), "inner").unwrap();
    fs::write(root.path().join("secret.txt"), "outside data").unwrap();
    root
}

fn app_for_root(root: &TempDir, policy: TraversalPolicy) -> Router {
    let mut config = Config::default();
    config.root_dir = Some(root.path().to_path_buf());
    config.security.traversal_policy = policy;
    let http = config.http.clone();
    let api = FileApi::new(config).unwrap();
    router(api, &http).unwrap()
}

async fn get(app: Router, uri: &str, auth: Option<String>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().uri(uri);
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn error_message(body: &[u8]) -> String {
    let json: serde_json::Value = serde_json::from_slice(body).unwrap();
    json["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn authorized_read_returns_exact_bytes() {
    let root = setup_root();
    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);

    let (status, body) = get(app, "/file?path=data/exists.txt", Some(basic("wazuh", "test"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, FIXTURE);
}

#[tokio::test]
async fn nested_file_is_readable() {
    let root = setup_root();
    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);

    let (status, body) = get(
        app,
        "/file?path=data/nested/inner.log",
        Some(basic("wazuh", "test")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"inner");
}

#[tokio::test]
async fn success_is_served_as_octet_stream() {
    let root = setup_root();
    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);

    let request = Request::builder()
        .uri("/file?path=data/exists.txt")
        .header(header::AUTHORIZATION, basic("wazuh", "test"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn unauthorized_responses_do_not_reveal_file_existence() {
    let root = setup_root();

    let cases = [
        ("/file?path=data/exists.txt", Some(basic("wazuh", "wrong"))),
        ("/file?path=data/missing.txt", Some(basic("wazuh", "wrong"))),
        ("/file?path=data/exists.txt", Some(basic("other", "test"))),
        ("/file?path=data/exists.txt", None),
        ("/file?path=/etc/passwd", None),
        ("/file?path=data/exists.txt", Some("Bearer token".to_string())),
    ];

    let mut bodies = Vec::new();
    for (uri, auth) in cases {
        let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);
        let (status, body) = get(app, uri, auth).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        bodies.push(body);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(error_message(&bodies[0]), "Unauthorized");
}

#[tokio::test]
async fn unauthorized_response_has_basic_challenge() {
    let root = setup_root();
    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);

    let request = Request::builder()
        .uri("/file?path=data/exists.txt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));
}

#[tokio::test]
async fn invalid_paths_are_bad_requests() {
    let root = setup_root();

    for uri in [
        "/file?path=/etc/passwd",
        "/file?path=../data/exists.txt",
        "/file?path=data/exists.txt%3Bls",
        "/file?path=data/with%20space",
        "/file?path=",
        "/file",
        "/file?path=data/../secret.txt",
    ] {
        let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);
        let (status, body) = get(app, uri, Some(basic("wazuh", "test"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(error_message(&body).starts_with("Invalid path") || error_message(&body) == "Missing path");
    }
}

#[tokio::test]
async fn literal_policy_traversal_is_still_contained() {
    let root = setup_root();
    let app = app_for_root(&root, TraversalPolicy::Literal);

    let (status, body) = get(
        app,
        "/file?path=data/../secret.txt",
        Some(basic("wazuh", "test")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!String::from_utf8_lossy(&body).contains("outside data"));
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let root = setup_root();
    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);

    let (status, body) = get(app, "/file?path=data/missing.txt", Some(basic("wazuh", "test"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error_message(&body).contains("data/missing.txt"));
}

#[derive(Default)]
struct CountingReader {
    calls: AtomicUsize,
}

#[async_trait]
impl FileReader for CountingReader {
    async fn read(&self, _path: &ValidatedPath) -> Result<Vec<u8>, FileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(b"double".to_vec())
    }
}

#[tokio::test]
async fn rejected_path_never_touches_the_reader() {
    let reader = Arc::new(CountingReader::default());
    let config = Config::default();
    let http = HttpConfig::default();
    let api = FileApi::with_components(
        config,
        PathBuf::from("/nonexistent"),
        Arc::new(StaticIdentityProvider::default()),
        reader.clone(),
    );

    let app = router(api.clone(), &http).unwrap();
    let (status, _) = get(app, "/file?path=data/a$b", Some(basic("wazuh", "test"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let app = router(api.clone(), &http).unwrap();
    let (status, _) = get(app, "/file?path=data/a.txt", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);

    let app = router(api, &http).unwrap();
    let (status, body) = get(app, "/file?path=data/a.txt", Some(basic("wazuh", "test"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"double");
    assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
}

/// Reader double that fails every read with a fixed error kind.
struct FailingReader {
    error: fn(&str) -> FileError,
}

#[async_trait]
impl FileReader for FailingReader {
    async fn read(&self, path: &ValidatedPath) -> Result<Vec<u8>, FileError> {
        Err((self.error)(path.as_str()))
    }
}

fn app_with_reader(reader: Arc<dyn FileReader>) -> Router {
    let api = FileApi::with_components(
        Config::default(),
        PathBuf::from("/nonexistent"),
        Arc::new(StaticIdentityProvider::default()),
        reader,
    );
    router(api, &HttpConfig::default()).unwrap()
}

#[tokio::test]
async fn access_denied_is_forbidden() {
    let app = app_with_reader(Arc::new(FailingReader {
        error: |path| FileError::access_denied(path),
    }));

    let (status, body) = get(app, "/file?path=data/locked.txt", Some(basic("wazuh", "test"))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Access denied: data/locked.txt");
}

#[tokio::test]
async fn io_failure_is_internal_error_without_details() {
    let app = app_with_reader(Arc::new(FailingReader {
        error: |path| {
            FileError::from_io(
                path,
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "device gone"),
            )
        },
    }));

    let (status, body) = get(app, "/file?path=data/broken.bin", Some(basic("wazuh", "test"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "Internal server error");
    assert!(!String::from_utf8_lossy(&body).contains("device gone"));
}

#[tokio::test]
async fn custom_read_route() {
    let root = setup_root();
    let mut config = Config::default();
    config.root_dir = Some(root.path().to_path_buf());
    config.http.read_path = "/api/read".to_string();
    let http = config.http.clone();
    let app = router(FileApi::new(config).unwrap(), &http).unwrap();

    let (status, body) = get(
        app,
        "/api/read?path=data/exists.txt",
        Some(basic("wazuh", "test")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, FIXTURE);
}

#[test]
fn invalid_read_route_is_rejected() {
    let api = FileApi::new(Config::default()).unwrap();

    for read_path in ["file", "/", "/health", "/files/{name}", "/files/:name", "/files/*rest"] {
        let http = HttpConfig {
            read_path: read_path.to_string(),
            ..HttpConfig::default()
        };
        assert!(
            matches!(router(api.clone(), &http), Err(TransportError::InvalidRoute(_))),
            "{read_path}"
        );
    }
}

#[tokio::test]
async fn health_and_root_are_public() {
    let root = setup_root();

    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);
    let (status, body) = get(app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");

    let app = app_for_root(&root, TraversalPolicy::RejectParentSegments);
    let (status, body) = get(app, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["endpoints"]["read"], "/file");
}
