// Integration tests against an in-process fake backend: the HTTP data mount
// for game tables and the `/ws/logs` WebSocket feed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use endfield_companion::config::websocket_base;
use endfield_companion::game_data::{
    GameDataStore, Language, LanguagePreference, TableName, TranslationKey,
};
use endfield_companion::log_stream::{
    ConnectionState, LogStreamClient, LogStreamOptions, ReconnectPolicy,
};
use endfield_companion::Error;

#[derive(Default)]
struct Backend {
    /// Resource path under `/api/data/` to body. Missing paths answer 404.
    bodies: Mutex<HashMap<String, String>>,
    data_requests: AtomicUsize,
    /// Lines sent to every log connection before the server closes it.
    log_lines: Vec<String>,
    log_connections: AtomicUsize,
}

async fn data(State(backend): State<Arc<Backend>>, Path(path): Path<String>) -> Response {
    backend.data_requests.fetch_add(1, Ordering::SeqCst);
    match backend.bodies.lock().unwrap().get(&path) {
        Some(body) => body.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn logs(State(backend): State<Arc<Backend>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_logs(socket, backend))
}

async fn stream_logs(mut socket: WebSocket, backend: Arc<Backend>) {
    backend.log_connections.fetch_add(1, Ordering::SeqCst);
    for line in &backend.log_lines {
        if socket.send(Message::Text(line.clone().into())).await.is_err() {
            return;
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}

async fn spawn_backend(backend: Arc<Backend>) -> SocketAddr {
    let app = Router::new()
        .route("/api/data/{*path}", get(data))
        .route("/ws/logs", get(logs))
        .with_state(backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A backend serving every table and translation file as `{}`, with `tables`
/// overriding individual bodies.
fn data_backend(tables: &[(TableName, &str)], i18n: &[(Language, &str)]) -> Backend {
    let mut bodies = HashMap::new();
    for name in TableName::ALL {
        bodies.insert(name.resource_path(), "{}".to_string());
    }
    for language in Language::ALL {
        bodies.insert(
            format!("endfielddata/TableCfg/I18nTextTable_{}.json", language.code()),
            "{}".to_string(),
        );
    }
    for (name, body) in tables {
        bodies.insert(name.resource_path(), body.to_string());
    }
    for (language, body) in i18n {
        bodies.insert(
            format!("endfielddata/TableCfg/I18nTextTable_{}.json", language.code()),
            body.to_string(),
        );
    }
    Backend {
        bodies: Mutex::new(bodies),
        ..Backend::default()
    }
}

const ITEMS: &str = r#"{
    "item_gold": {
        "id": "item_gold",
        "name": {"id": 9007199254740993123, "text": "折金票"},
        "iconId": "item_gold",
        "rarity": 3
    }
}"#;
const RARITY: &str = r##"{"3": {"color": "#26BBFD", "rarity": 3}}"##;

// ── Game data over HTTP ──────────────────────────────────────────────

#[tokio::test]
async fn test_http_store_loads_and_translates() {
    let backend = Arc::new(data_backend(
        &[(TableName::Item, ITEMS), (TableName::RarityColor, RARITY)],
        &[(Language::En, r#"{"9007199254740993123": "Orundum"}"#)],
    ));
    let addr = spawn_backend(backend.clone()).await;

    let store = GameDataStore::http(
        &format!("http://{addr}"),
        Arc::new(LanguagePreference::in_memory(Language::En)),
    );
    store.initialize().await.unwrap();
    assert!(store.is_loaded());
    assert_eq!(backend.data_requests.load(Ordering::SeqCst), 16);

    // The 19-digit id survives parsing and matches the translation key.
    assert_eq!(store.item_name("item_gold", None), "Orundum");
    assert_eq!(store.item_name("item_gold", Some(Language::Jp)), "折金票");
    assert_eq!(
        store.get_translation(&TranslationKey::new("9007199254740993123", "x"), None),
        "Orundum"
    );
    assert_eq!(store.item_tier_color("item_gold").to_css(), "#26bbfd");

    store.initialize().await.unwrap();
    assert_eq!(backend.data_requests.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn test_http_store_missing_table_fails_whole_load() {
    let backend = data_backend(&[(TableName::Item, ITEMS)], &[]);
    backend
        .bodies
        .lock()
        .unwrap()
        .remove(&TableName::WikiGroup.resource_path());
    let addr = spawn_backend(Arc::new(backend)).await;

    let store = GameDataStore::http(
        &format!("http://{addr}/"),
        Arc::new(LanguagePreference::in_memory(Language::En)),
    );
    let err = store.initialize().await.unwrap_err();
    match err {
        Error::HttpStatus { resource, status } => {
            assert_eq!(status, 404);
            assert_eq!(resource, TableName::WikiGroup.resource_path());
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(!store.is_loaded());
    assert!(store.tables().items.is_empty());
    assert_eq!(store.item_name("item_gold", None), "item_gold");
}

#[tokio::test]
async fn test_http_store_unreachable_backend() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = GameDataStore::http(
        &format!("http://{addr}"),
        Arc::new(LanguagePreference::in_memory(Language::Cn)),
    );
    let err = store.initialize().await.unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "got {err:?}");
    assert!(!store.is_loaded());
}

// ── Log stream over WebSocket ────────────────────────────────────────

fn logs_url(addr: SocketAddr) -> String {
    format!("{}/ws/logs", websocket_base(&format!("http://{addr}")))
}

async fn recv_line(rx: &mut tokio::sync::broadcast::Receiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a log line")
        .unwrap()
}

#[tokio::test]
async fn test_log_stream_receives_and_reconnects() {
    let backend = Arc::new(Backend {
        log_lines: vec!["booting".into(), "\x1b[32mready\x1b[0m".into()],
        ..Backend::default()
    });
    let addr = spawn_backend(backend.clone()).await;

    let client = LogStreamClient::websocket(
        logs_url(addr),
        LogStreamOptions {
            policy: ReconnectPolicy::fixed(Duration::from_millis(50)),
            convert_ansi: true,
            ..Default::default()
        },
    );
    let mut rx = client.subscribe();
    assert!(client.mount());

    assert_eq!(recv_line(&mut rx).await, "booting");
    assert_eq!(
        recv_line(&mut rx).await,
        r#"<span style="color:#0A0">ready</span>"#
    );
    // The server closes after each batch; the client comes back for more.
    assert_eq!(recv_line(&mut rx).await, "booting");
    assert!(backend.log_connections.load(Ordering::SeqCst) >= 2);

    client.unmount().await;
    assert!(!client.is_mounted());
    assert_eq!(client.state(), ConnectionState::Disconnected);
    let logs = client.logs();
    assert!(logs.len() >= 3);
    assert_eq!(logs[0], "booting");
}

#[tokio::test]
async fn test_log_stream_gives_up_on_dead_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LogStreamClient::websocket(
        logs_url(addr),
        LogStreamOptions {
            policy: ReconnectPolicy::fixed(Duration::from_millis(10)).with_max_attempts(2),
            ..Default::default()
        },
    );
    client.mount();

    tokio::time::timeout(Duration::from_secs(5), async {
        while client.is_mounted() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("supervisor should stop after exhausting attempts");
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(client.logs().is_empty());
}
