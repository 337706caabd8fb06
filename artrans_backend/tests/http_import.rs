use artrans_backend::api::{self, AppState};
use artrans_backend::config::{ArtransConfig, ArtransPaths};
use artrans_backend::database::repositories::CommentRepository;
use artrans_backend::database::Database;
use serde_json::Value;
use tokio::net::TcpListener;

struct TestServer {
    database: Database,
    base_url: String,
    server: tokio::task::JoinHandle<()>,
}

async fn spawn_server() -> TestServer {
    let database = Database::open_in_memory().expect("db");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = AppState {
        config: ArtransConfig::new(addr.port(), ArtransPaths::default()),
        database: database.clone(),
    };
    let server = tokio::spawn(async move {
        axum::serve(listener, api::router(state).into_make_service())
            .await
            .expect("serve");
    });
    TestServer {
        database,
        base_url: format!("http://{addr}"),
        server,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn post_import_reports_counts_and_progress() {
    let server = spawn_server().await;
    let body = r#"[
        {"id": "1", "content": "root", "nick": "n", "email": "n@example.com",
         "page_key": "/p", "site_name": "Blog"},
        {"id": "2", "rid": "1", "content": "reply", "nick": "m", "email": "m@example.com",
         "page_key": "/p", "site_name": "Blog"}
    ]"#;

    let resp = reqwest::Client::new()
        .post(format!("{}/import?site_name=Mirror", server.base_url))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let json: Value = resp.json().await.expect("json body");
    assert_eq!(json["total"], 2);
    assert_eq!(json["imported"], 2);
    assert_eq!(json["skipped"].as_array().map(Vec::len), Some(0));
    let log = json["log"].as_str().unwrap_or_default();
    assert!(log.contains("0%... "));
    assert!(log.contains("Imported 2 comments"));

    let comments = server
        .database
        .with_repositories(|repos| repos.comments().list())
        .expect("list");
    assert!(comments.iter().all(|c| c.site_name == "Mirror"));
    assert_eq!(comments[1].rid, comments[0].id);

    server.server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalid_payloads_are_bad_requests() {
    let server = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/import", server.base_url))
        .body("[]")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let json: Value = resp.json().await.expect("json body");
    assert_eq!(json["message"], "no comments found in input");

    let resp = reqwest::Client::new()
        .post(format!("{}/import?site_url=ftp://nope", server.base_url))
        .body(r#"[{"id": "1", "content": "x"}]"#)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let resp = reqwest::Client::new()
        .post(format!("{}/import", server.base_url))
        .body(r#"{"id":1}"#)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let json: Value = resp.json().await.expect("json body");
    let message = json["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("failed to decode artrans JSON"));

    let comments = server
        .database
        .with_repositories(|repos| repos.comments().list())
        .expect("list");
    assert!(comments.is_empty());

    server.server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_version() {
    let server = spawn_server().await;
    let json: Value = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    server.server.abort();
}
