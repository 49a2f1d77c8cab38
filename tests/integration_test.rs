//! Integration tests for recording over a real connection

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

use httpdoc::{
    record, CollectingReporter, Config, Data, Document, RecordOptions, TeeBody, TestCase,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn create_user(
    request: Request<TeeBody<Incoming>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let body = request.into_body().collect().await.unwrap().to_bytes();
    let user: Value = serde_json::from_slice(&body).unwrap();

    let response = json!({
        "id": 11_241_988,
        "name": user["name"],
        "setting": { "email": "tcnksm@mail.com" },
    });
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("X-API-Status", "ok")
        .body(Full::new(Bytes::from(response.to_string())))
        .unwrap())
}

/// Serve `options`-recorded `create_user` on an ephemeral port
async fn spawn_server(document: Arc<Document>, options: RecordOptions) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = record(service_fn(create_user), document, options);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let service = service.clone();
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

async fn post_user(addr: SocketAddr) -> (StatusCode, String, Bytes) {
    let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
    let request = Request::post(format!("http://{addr}/v1/user?token=12345"))
        .header("X-Version", "2")
        .body(Full::new(Bytes::from_static(
            br#"{"name":"tcnksm","attribute":{"birthday":"1988-11-24"}}"#,
        )))
        .unwrap();

    let response = client.request(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, body)
}

fn user_options(reporter: Arc<CollectingReporter>) -> RecordOptions {
    RecordOptions::new()
        .description("Create a new user")
        .exclude_headers(["Host", "Content-Length"])
        .reporter(reporter)
        .with_validate(|v| {
            v.request_params(&[TestCase::new("token", "12345", "Request token")]);
            v.request_headers(&[TestCase::new("X-Version", "2", "Request API version")]);
            v.request_body(&[
                TestCase::new("name", "tcnksm", "User Name"),
                TestCase::new("attribute.birthday", "1988-11-24", "User birthday"),
            ]);
            v.response_status_code(200);
            v.response_headers(&[TestCase::new(
                "Content-Type",
                "application/json",
                "Response format",
            )]);
            v.response_body(&[
                TestCase::new("id", 11_241_988, "User ID assigned"),
                TestCase::new("setting.email", "tcnksm@mail.com", "User email address"),
            ]);
        })
}

#[tokio::test]
async fn test_recorded_exchange_reaches_client_unchanged() {
    init_tracing();
    let document = Arc::new(Document::new("Example API"));
    let reporter = Arc::new(CollectingReporter::new());
    let addr = spawn_server(Arc::clone(&document), user_options(reporter.clone())).await;

    let (status, content_type, body) = post_user(addr).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "tcnksm");
    assert!(reporter.is_clean(), "{:?}", reporter.failures());
}

#[tokio::test]
async fn test_entry_merges_declared_and_observed_values() {
    init_tracing();
    let document = Arc::new(Document::new("Example API"));
    let reporter = Arc::new(CollectingReporter::new());
    let addr = spawn_server(Arc::clone(&document), user_options(reporter.clone())).await;

    post_user(addr).await;

    let entries = document.entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];

    assert_eq!(entry.description, "Create a new user");
    assert_eq!(entry.method, "POST");
    assert_eq!(entry.path, "/v1/user");
    assert_eq!(
        entry.request_params,
        vec![Data::new("token", "12345", "Request token")]
    );
    assert_eq!(
        entry.request_headers,
        vec![Data::new("X-Version", "2", "Request API version")]
    );
    assert_eq!(entry.request_fields.len(), 2);
    assert_eq!(
        entry.request_example,
        r#"{"name":"tcnksm","attribute":{"birthday":"1988-11-24"}}"#
    );
    assert_eq!(entry.response_status_code, 200);
    assert_eq!(
        entry.response_headers,
        vec![
            Data::new("Content-Type", "application/json", "Response format"),
            Data::new("X-Api-Status", "ok", ""),
        ]
    );
    assert_eq!(
        entry.response_fields,
        vec![
            Data::new("id", 11_241_988, "User ID assigned"),
            Data::new("setting.email", "tcnksm@mail.com", "User email address"),
        ]
    );
}

#[tokio::test]
async fn test_mismatch_is_reported_and_still_documented() {
    init_tracing();
    let document = Arc::new(Document::new("Example API"));
    let reporter = Arc::new(CollectingReporter::new());
    let options = RecordOptions::new()
        .reporter(reporter.clone())
        .with_validate(|v| {
            v.response_body(&[TestCase::new("setting.phone", "000", "User phone")]);
        });
    let addr = spawn_server(Arc::clone(&document), options).await;

    let (status, _, _) = post_user(addr).await;

    assert_eq!(status, StatusCode::OK);
    let failures = reporter.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("setting.phone"));
    assert_eq!(document.len(), 1);
}

#[tokio::test]
async fn test_generate_document_from_config() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = Config {
        name: "Example API".to_string(),
        exclude_headers: vec!["Host".to_string(), "Content-Length".to_string()],
        template: None,
    };
    let document = Arc::new(Document::from_config(&config).unwrap());
    let reporter = Arc::new(CollectingReporter::new());
    let options = user_options(reporter.clone()).exclude_headers(["X-Api-Status"]);
    let addr = spawn_server(Arc::clone(&document), options).await;

    post_user(addr).await;

    // Only test in this binary that touches the environment
    std::env::set_var(httpdoc::document::ENV_HTTPDOC, "1");
    let path = dir.path().join("doc.md");
    document.generate(&path).unwrap();
    std::env::remove_var(httpdoc::document::ENV_HTTPDOC);

    let markdown = std::fs::read_to_string(&path).unwrap();
    assert!(markdown.starts_with("# Example API"));
    assert!(markdown.contains("* [POST /v1/user](#post-v1user)"));
    assert!(markdown.contains("| token | 12345 | Request token |"));
    assert!(markdown.contains("| attribute.birthday | 1988-11-24 | User birthday |"));
    assert!(markdown.contains("| id | 11241988 | User ID assigned |"));
    assert!(markdown.contains("Status: 200"));
    assert!(!markdown.contains("X-Api-Status"));
    assert!(!markdown.contains("| Host |"));
}
