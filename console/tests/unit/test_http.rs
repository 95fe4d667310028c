//! HTTP client tests against an in-process publishing server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use pubconsole::deploy::fsm::WorkflowState;
use pubconsole::deploy::naming::AppName;
use pubconsole::deploy::selector::FileCandidate;
use pubconsole::deploy::workflow::DeployWorkflow;
use pubconsole::errors::ConsoleError;
use pubconsole::http::api::PublishApi;
use pubconsole::http::client::HttpClient;
use pubconsole::http::progress::ProgressSender;
use pubconsole::listing::controller::AppListController;
use pubconsole::filesys::file::File;
use pubconsole::models::bundle::{BundleSource, StagedFile};
use pubconsole::models::deploy::DeployOptions;
use pubconsole::storage::settings::{ApiSettings, UploadSettings};

#[derive(Debug, Clone, Default)]
struct Upload {
    app: String,
    file_name: Option<String>,
    content_type: Option<String>,
    file: Vec<u8>,
    clean: Option<String>,
}

#[derive(Clone)]
struct Server {
    status: StatusCode,
    body: &'static str,
    uploads: Arc<Mutex<Vec<Upload>>>,
    hits: Arc<Mutex<Vec<String>>>,
    list_hits: Arc<AtomicUsize>,
}

impl Server {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            uploads: Arc::new(Mutex::new(Vec::new())),
            hits: Arc::new(Mutex::new(Vec::new())),
            list_hits: Arc::new(AtomicUsize::new(0)),
        }
    }
}

async fn handle_deploy(
    State(state): State<Server>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> (StatusCode, &'static str) {
    let mut upload = Upload {
        app: name,
        ..Default::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap_or_default();
        match field_name.as_str() {
            "file" => {
                upload.file_name = file_name;
                upload.content_type = content_type;
                upload.file = data.to_vec();
            }
            "clean" => upload.clean = Some(String::from_utf8_lossy(&data).into_owned()),
            _ => {}
        }
    }
    state.uploads.lock().await.push(upload);
    (state.status, state.body)
}

async fn handle_named(
    State(state): State<Server>,
    Path(name): Path<String>,
) -> (StatusCode, &'static str) {
    state.hits.lock().await.push(name);
    (state.status, state.body)
}

async fn handle_list(State(state): State<Server>) -> (StatusCode, &'static str) {
    state.list_hits.fetch_add(1, Ordering::SeqCst);
    (state.status, state.body)
}

fn router(state: Server) -> Router {
    Router::new()
        .route("/health", get(handle_list))
        .route("/api/apps", get(handle_list))
        .route("/api/apps/{name}", delete(handle_named))
        .route("/api/apps/{name}/deploy", post(handle_deploy))
        .route("/api/apps/{name}/invalidate", post(handle_named))
        .with_state(state)
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on
async fn closed_port() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client(base_url: &str, chunk_size: usize) -> HttpClient {
    let api = ApiSettings {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    HttpClient::with_settings(&api, &UploadSettings { chunk_size }).unwrap()
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<u8>) -> Vec<u8> {
    let mut events = Vec::new();
    while let Ok(percent) = rx.try_recv() {
        events.push(percent);
    }
    events
}

#[tokio::test]
async fn test_deploy_sends_multipart_form() {
    let server = Server::new(StatusCode::OK, r#"{"uploaded":42,"url":"/myapp/"}"#);
    let base_url = spawn_server(router(server.clone())).await;
    let client = client(&base_url, 4);
    let bundle = StagedFile::from_bytes("myapp.zip", (0u8..16).collect());
    let (progress, mut rx) = ProgressSender::channel();

    let result = client
        .deploy_bundle(
            &AppName::parse("myapp").unwrap(),
            &bundle,
            DeployOptions { clean: true },
            progress,
        )
        .await
        .unwrap();

    assert_eq!(result.uploaded, 42);
    assert_eq!(result.url, "/myapp/");

    let uploads = server.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].app, "myapp");
    assert_eq!(uploads[0].file_name.as_deref(), Some("myapp.zip"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/zip"));
    assert_eq!(uploads[0].file, (0u8..16).collect::<Vec<u8>>());
    assert_eq!(uploads[0].clean.as_deref(), Some("true"));

    let events = drain(&mut rx);
    assert_eq!(events.first(), Some(&0));
    assert_eq!(events.last(), Some(&100));
    assert!(events.windows(2).all(|w| w[0] < w[1]), "{:?}", events);
    assert!(events.contains(&50), "{:?}", events);
}

#[tokio::test]
async fn test_deploy_streams_bundle_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.zip");
    let data: Vec<u8> = (0..256 * 1024u32).map(|i| (i % 253) as u8).collect();
    tokio::fs::write(&path, &data).await.unwrap();

    let server = Server::new(StatusCode::OK, r#"{"uploaded":7,"url":"/site/"}"#);
    let base_url = spawn_server(router(server.clone())).await;
    let client = client(&base_url, 16 * 1024);
    let bundle = StagedFile {
        name: "site.zip".to_string(),
        size_bytes: data.len() as u64,
        source: BundleSource::Path(File::new(&path)),
    };
    let (progress, mut rx) = ProgressSender::channel();

    let result = client
        .deploy_bundle(
            &AppName::parse("site").unwrap(),
            &bundle,
            DeployOptions::default(),
            progress,
        )
        .await
        .unwrap();

    assert_eq!(result.uploaded, 7);
    assert_eq!(server.uploads.lock().await[0].file, data);

    // Progress advances chunk by chunk
    let events = drain(&mut rx);
    assert_eq!(events.first(), Some(&0));
    assert_eq!(events.last(), Some(&100));
    assert!(events.len() > 10, "{:?}", events);
    assert!(events.windows(2).all(|w| w[0] < w[1]), "{:?}", events);
}

#[tokio::test]
async fn test_deploy_clean_false_is_explicit() {
    let server = Server::new(StatusCode::OK, r#"{"uploaded":1,"url":"/a/"}"#);
    let base_url = spawn_server(router(server.clone())).await;
    let bundle = StagedFile::from_bytes("a.zip", vec![1, 2, 3]);
    let (progress, _rx) = ProgressSender::channel();

    client(&base_url, 1024)
        .deploy_bundle(
            &AppName::parse("a").unwrap(),
            &bundle,
            DeployOptions::default(),
            progress,
        )
        .await
        .unwrap();

    assert_eq!(server.uploads.lock().await[0].clean.as_deref(), Some("false"));
}

#[tokio::test]
async fn test_deploy_rejection_uses_detail() {
    let server = Server::new(StatusCode::PAYLOAD_TOO_LARGE, r#"{"detail":"too large"}"#);
    let base_url = spawn_server(router(server)).await;
    let bundle = StagedFile::from_bytes("huge.zip", vec![0; 64]);
    let (progress, _rx) = ProgressSender::channel();

    let err = client(&base_url, 16)
        .deploy_bundle(
            &AppName::parse("huge").unwrap(),
            &bundle,
            DeployOptions::default(),
            progress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::UploadRejected { status: 413, .. }));
    assert_eq!(err.to_string(), "too large");
}

#[tokio::test]
async fn test_deploy_malformed_success_body() {
    let server = Server::new(StatusCode::OK, "<html>ok</html>");
    let base_url = spawn_server(router(server)).await;
    let bundle = StagedFile::from_bytes("site.zip", vec![0; 8]);
    let (progress, _rx) = ProgressSender::channel();

    let err = client(&base_url, 16)
        .deploy_bundle(
            &AppName::parse("site").unwrap(),
            &bundle,
            DeployOptions::default(),
            progress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::MalformedResponse { status: 200 }));
}

#[tokio::test]
async fn test_deploy_unreachable_server() {
    let base_url = closed_port().await;
    let bundle = StagedFile::from_bytes("site.zip", vec![0; 8]);
    let (progress, _rx) = ProgressSender::channel();

    let err = client(&base_url, 16)
        .deploy_bundle(
            &AppName::parse("site").unwrap(),
            &bundle,
            DeployOptions::default(),
            progress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::UploadTransportFailure(_)));
}

#[tokio::test]
async fn test_empty_bundle_reports_no_progress() {
    let server = Server::new(StatusCode::OK, r#"{"uploaded":0,"url":"/empty/"}"#);
    let base_url = spawn_server(router(server)).await;
    let bundle = StagedFile::from_bytes("empty.zip", vec![]);
    let (progress, mut rx) = ProgressSender::channel();

    client(&base_url, 16)
        .deploy_bundle(
            &AppName::parse("empty").unwrap(),
            &bundle,
            DeployOptions::default(),
            progress,
        )
        .await
        .unwrap();

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_list_apps() {
    let server = Server::new(
        StatusCode::OK,
        r#"{"apps":[
            {"name":"blog","url":"/blog/","file_count":3,"total_size_human":"1.2 KB","last_modified_human":"2026-10-01 12:00"},
            {"name":"docs","url":"/docs/"}
        ]}"#,
    );
    let base_url = spawn_server(router(server)).await;

    let apps = client(&base_url, 16).list_apps().await.unwrap();

    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].name, "blog");
    assert_eq!(apps[0].file_count, 3);
    assert_eq!(apps[1].name, "docs");
    assert_eq!(apps[1].last_modified_human, "–");
}

#[tokio::test]
async fn test_list_without_apps_field_is_empty() {
    let server = Server::new(StatusCode::OK, "{}");
    let base_url = spawn_server(router(server)).await;

    assert!(client(&base_url, 16).list_apps().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_failures_are_unavailable() {
    let server = Server::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let base_url = spawn_server(router(server)).await;
    let err = client(&base_url, 16).list_apps().await.unwrap_err();
    assert!(matches!(err, ConsoleError::ListUnavailable(ref m) if m == "HTTP 500"));

    let server = Server::new(StatusCode::OK, "not json");
    let base_url = spawn_server(router(server)).await;
    let err = client(&base_url, 16).list_apps().await.unwrap_err();
    assert!(matches!(err, ConsoleError::ListUnavailable(_)));

    let err = client(&closed_port().await, 16).list_apps().await.unwrap_err();
    assert!(matches!(err, ConsoleError::ListUnavailable(_)));
}

#[tokio::test]
async fn test_invalidate_encodes_name() {
    let server = Server::new(StatusCode::OK, r#"{"app":"my app","invalidated":true}"#);
    let base_url = spawn_server(router(server.clone())).await;
    let client = client(&base_url, 16);

    client.invalidate_app("my app").await.unwrap();
    client.invalidate_app("a/b").await.unwrap();

    assert_eq!(*server.hits.lock().await, vec!["my app", "a/b"]);
}

#[tokio::test]
async fn test_invalidate_rejection_uses_error_field() {
    let server = Server::new(StatusCode::BAD_GATEWAY, r#"{"error":"cdn unavailable"}"#);
    let base_url = spawn_server(router(server)).await;

    let err = client(&base_url, 16).invalidate_app("blog").await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "cdn unavailable");
}

#[tokio::test]
async fn test_delete_status_mapping() {
    let server = Server::new(StatusCode::NO_CONTENT, "");
    let base_url = spawn_server(router(server.clone())).await;
    client(&base_url, 16).delete_app("blog").await.unwrap();
    assert_eq!(*server.hits.lock().await, vec!["blog"]);

    let server = Server::new(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"disk full"}"#);
    let base_url = spawn_server(router(server)).await;
    let err = client(&base_url, 16).delete_app("blog").await.unwrap_err();
    assert!(matches!(err, ConsoleError::ActionRejected { status: 500, .. }));
    assert_eq!(err.to_string(), "HTTP 500");

    let err = client(&closed_port().await, 16).delete_app("blog").await.unwrap_err();
    assert!(matches!(err, ConsoleError::ActionTransportFailure(_)));
}

#[tokio::test]
async fn test_health() {
    let server = Server::new(StatusCode::OK, r#"{"status":"ok"}"#);
    let base_url = spawn_server(router(server)).await;
    assert_eq!(client(&base_url, 16).health().await.unwrap().status, "ok");

    let server = Server::new(StatusCode::SERVICE_UNAVAILABLE, "");
    let base_url = spawn_server(router(server)).await;
    assert!(client(&base_url, 16).health().await.is_err());
}

#[tokio::test]
async fn test_workflow_end_to_end() {
    let server = Server::new(StatusCode::OK, r#"{"uploaded":42,"url":"/myapp/"}"#);
    let base_url = spawn_server(router(server.clone())).await;
    let api: Arc<dyn PublishApi> = Arc::new(client(&base_url, 8));
    let list = Arc::new(AppListController::new(api.clone()));
    let mut workflow = DeployWorkflow::new(api, list.clone());

    workflow
        .select(FileCandidate::from_bytes("MyApp.zip", vec![9; 40]))
        .unwrap();
    let state = workflow.submit(DeployOptions::default()).await.unwrap();
    match state {
        WorkflowState::Succeeded(result) => {
            assert_eq!(result.uploaded, 42);
            assert_eq!(result.url, "/myapp/");
        }
        state => panic!("expected a successful deploy, got {:?}", state),
    }

    workflow.settle().await;
    assert_eq!(server.list_hits.load(Ordering::SeqCst), 1);
    assert_eq!(server.uploads.lock().await[0].app, "myapp");
}
