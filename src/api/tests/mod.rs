use super::*;
use crate::error::ApiError;
use crate::export::CliConverter;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;
use tower::ServiceExt;

/// Router whose converter is `sh -c <script>`, working under a temp dir
fn router_with_script(script: &str) -> (Router, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.export.work_dir = dir.path().to_path_buf();

    let converter = CliConverter::new(PathBuf::from("sh")).with_args(vec![
        "-c".into(),
        script.into(),
        "converter".into(),
    ]);
    let exporter = Arc::new(RepoExporter::new(Arc::new(converter), &config.export));
    (create_router(exporter, Arc::new(config)), dir)
}

fn download_request(repo_url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/download-repo")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "repoUrl": repo_url }).to_string(),
        ))
        .unwrap()
}

#[cfg(unix)]
#[tokio::test]
async fn download_returns_converter_output() {
    let (app, dir) = router_with_script(r#"printf 'File: %s\n\n' "$1" > out.txt; echo out.txt"#);

    let response = app
        .oneshot(download_request("https://github.com/a/b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"out.txt\""
    );
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"File: https://github.com/a/b\n\n");

    // request directory is removed once the file is sent
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn failed_conversion_returns_stderr() {
    let (app, _dir) = router_with_script("echo 'fatal: repository not found' >&2; exit 3");

    let response = app
        .oneshot(download_request("https://github.com/a/missing"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        error,
        ApiError::new("Error processing repository", "fatal: repository not found\n")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn missing_artifact_is_send_error() {
    let (app, _dir) = router_with_script("echo nothing-here.txt");

    let response = app
        .oneshot(download_request("https://github.com/a/b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "Error sending file");
}

#[cfg(unix)]
#[tokio::test]
async fn hostile_url_is_not_interpreted() {
    let (app, dir) = router_with_script(r#"printf '%s' "$1" > out.txt; echo out.txt"#);
    let hostile = "x; touch pwned #";

    let response = app.oneshot(download_request(hostile)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], hostile.as_bytes());
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _dir) = router_with_script("true");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["mode"], "external");
    assert_eq!(json["converter"], "cli");
}

#[tokio::test]
async fn openapi_is_served() {
    let (app, _dir) = router_with_script("true");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _dir) = router_with_script("true");

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_origin_list() {
    let mut config = Config::default();
    config.server.cors_origins = vec!["http://localhost:5173".into()];
    let config = Arc::new(config);
    let exporter = Arc::new(RepoExporter::from_config(&config).unwrap());
    let app = create_router(exporter, config);

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );

    let other = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(other.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.server.cors_enabled = false;
    let config = Arc::new(config);
    let exporter = Arc::new(RepoExporter::from_config(&config).unwrap());
    let app = create_router(exporter, config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_api_server_shuts_down() {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);
    let exporter = Arc::new(RepoExporter::from_config(&config).unwrap());

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server(exporter, config, async move {
        let _ = rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
