//! API integration tests
//!
//! Each test serves the real router on an ephemeral port, backed by a scratch
//! SQLite database or JSON file.

use std::sync::Arc;

use reqwest::{header, Client, Method, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use bookshelf_server::{
    api,
    config::AppConfig,
    repository::{JsonFileBookStore, Repository, SqliteBookStore},
    AppState,
};

#[derive(Clone, Copy, Debug)]
enum Backend {
    Sqlite,
    Json,
}

const BACKENDS: [Backend; 2] = [Backend::Sqlite, Backend::Json];

struct TestApp {
    base_url: String,
    dir: TempDir,
}

impl TestApp {
    fn books_url(&self) -> String {
        format!("{}/api/books", self.base_url)
    }
}

async fn open_repository(backend: Backend, dir: &TempDir) -> Repository {
    match backend {
        Backend::Sqlite => {
            let url = format!("sqlite://{}", dir.path().join("app.db").display());
            let store = SqliteBookStore::connect(&url, 4)
                .await
                .expect("Failed to open SQLite store");
            Repository::new(Arc::new(store))
        }
        Backend::Json => {
            let path = dir.path().join("books.json");
            JsonFileBookStore::bootstrap(&path)
                .await
                .expect("Failed to create book file");
            let store = JsonFileBookStore::open(&path)
                .await
                .expect("Failed to open JSON store");
            Repository::new(Arc::new(store))
        }
    }
}

async fn serve(repository: Repository) -> String {
    let app = api::create_router(AppState::new(AppConfig::default(), repository));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

async fn spawn_app(backend: Backend) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let repository = open_repository(backend, &dir).await;
    let base_url = serve(repository).await;
    TestApp { base_url, dir }
}

async fn list(client: &Client, app: &TestApp) -> Value {
    let response = client
        .get(app.books_url())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app(Backend::Sqlite).await;

    let response = Client::new()
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["books"], 0);
}

#[tokio::test]
async fn test_health_check_reports_storage_failure() {
    let app = spawn_app(Backend::Json).await;
    std::fs::remove_file(app.dir.path().join("books.json")).expect("Failed to remove book file");

    let response = Client::new()
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "unhealthy");
    assert!(body.get("books").is_none());
}

#[tokio::test]
async fn test_create_then_list() {
    for backend in BACKENDS {
        let app = spawn_app(backend).await;
        let client = Client::new();

        let response = client
            .post(app.books_url())
            .json(&json!({
                "name": "The Stranger",
                "author": "Albert Camus",
                "finished": true
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::CREATED, "{:?}", backend);
        assert_eq!(response.headers()[header::LOCATION], "/api/books/1");
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(
            body,
            json!({"id": 1, "name": "The Stranger", "author": "Albert Camus", "finished": true})
        );

        let books = list(&client, &app).await;
        assert_eq!(books, json!([body]), "{:?}", backend);
    }
}

#[tokio::test]
async fn test_blank_name_rejected_and_store_unchanged() {
    for backend in BACKENDS {
        let app = spawn_app(backend).await;
        let client = Client::new();

        let response = client
            .post(app.books_url())
            .json(&json!({"name": "", "author": "X"}))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{:?}", backend);
        let message = response.text().await.expect("Failed to read body");
        assert!(message.contains("name"), "{}", message);

        assert_eq!(list(&client, &app).await, json!([]));
    }
}

#[tokio::test]
async fn test_missing_author_rejected() {
    let app = spawn_app(Backend::Json).await;

    let response = Client::new()
        .post(app.books_url())
        .json(&json!({"name": "Dune"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.expect("Failed to read body"),
        "author must not be empty"
    );
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let app = spawn_app(Backend::Sqlite).await;

    let response = Client::new()
        .post(app.books_url())
        .body("")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.expect("Failed to read body"), "empty body");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = spawn_app(Backend::Sqlite).await;

    let response = Client::new()
        .post(app.books_url())
        .header(header::CONTENT_TYPE, "application/json")
        .body(r#"{"name": "Dune", "author": "#)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = response.text().await.expect("Failed to read body");
    assert!(message.starts_with("invalid JSON: "), "{}", message);
    assert!(message.len() > "invalid JSON: ".len());
}

#[tokio::test]
async fn test_body_accepted_without_content_type() {
    let app = spawn_app(Backend::Sqlite).await;

    let response = Client::new()
        .post(app.books_url())
        .body(r#"{"name": "Dune", "author": "Frank Herbert"}"#)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["finished"], false);
}

#[tokio::test]
async fn test_other_methods_not_allowed() {
    let app = spawn_app(Backend::Sqlite).await;
    let client = Client::new();

    for response in [
        client.put(app.books_url()).send().await,
        client.delete(app.books_url()).send().await,
        client.patch(app.books_url()).send().await,
        client.head(app.books_url()).send().await,
        client.request(Method::OPTIONS, app.books_url()).send().await,
    ] {
        let response = response.expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }
}

#[tokio::test]
async fn test_ids_increase_and_list_is_ordered() {
    for backend in BACKENDS {
        let app = spawn_app(backend).await;
        let client = Client::new();

        let mut ids = Vec::new();
        for i in 0..5 {
            let response = client
                .post(app.books_url())
                .json(&json!({"name": format!("Volume {}", i), "author": "Anon"}))
                .send()
                .await
                .expect("Failed to send request");
            assert_eq!(response.status(), StatusCode::CREATED);
            let body: Value = response.json().await.expect("Failed to parse response");
            ids.push(body["id"].as_i64().expect("No book ID"));
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{:?}: {:?}", backend, ids);

        let listed: Vec<i64> = list(&client, &app)
            .await
            .as_array()
            .expect("Expected an array")
            .iter()
            .map(|b| b["id"].as_i64().expect("No book ID"))
            .collect();
        assert_eq!(listed, ids);
    }
}

#[tokio::test]
async fn test_ids_not_reused_after_restart() {
    for backend in BACKENDS {
        let app = spawn_app(backend).await;
        let client = Client::new();

        let response = client
            .post(app.books_url())
            .json(&json!({"name": "First", "author": "A"}))
            .send()
            .await
            .expect("Failed to send request");
        let first: Value = response.json().await.expect("Failed to parse response");

        // A second server over the same storage medium
        let restarted = serve(open_repository(backend, &app.dir).await).await;
        let response = client
            .post(format!("{}/api/books", restarted))
            .json(&json!({"name": "Second", "author": "B"}))
            .send()
            .await
            .expect("Failed to send request");
        let second: Value = response.json().await.expect("Failed to parse response");

        assert!(
            second["id"].as_i64() > first["id"].as_i64(),
            "{:?}: {} then {}",
            backend,
            first,
            second
        );
    }
}

#[tokio::test]
async fn test_storage_failure_is_opaque() {
    let app = spawn_app(Backend::Json).await;
    let client = Client::new();

    std::fs::remove_file(app.dir.path().join("books.json")).expect("Failed to remove book file");

    let response = client
        .get(app.books_url())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.expect("Failed to read body"), "internal error");

    let response = client
        .post(app.books_url())
        .json(&json!({"name": "Dune", "author": "Frank Herbert"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.expect("Failed to read body"), "internal error");
}

#[tokio::test]
async fn test_oversized_body_rejected_as_too_large() {
    let app = spawn_app(Backend::Sqlite).await;
    let client = Client::new();

    let name = "x".repeat(3 * 1024 * 1024);
    let response = client
        .post(app.books_url())
        .json(&json!({"name": name, "author": "Anon"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(list(&client, &app).await, json!([]));
}
