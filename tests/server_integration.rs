//! End-to-end exercise of the compatibility HTTP server against a real
//! socket, covering the literal scenarios from the spec's testable
//! properties (empty-buffer fallback, insertion-order drain, and the
//! validation-failure paths).

use cardano_p2p_relay::buffer::ProducerBuffer;
use cardano_p2p_relay::config::ServerSettings;
use cardano_p2p_relay::model::Producer;
use cardano_p2p_relay::server;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

async fn spawn_server(settings: ServerSettings, buffer: Arc<ProducerBuffer>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(server::AppState { buffer, settings });
    let app = server::router(state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    addr
}

fn settings(default_peer: Option<&str>) -> ServerSettings {
    ServerSettings {
        listen_addr: ":0".to_string(),
        read_timeout: Duration::from_millis(100),
        max_peers: 10,
        default_peer: default_peer.map(str::to_string),
        magic: 1,
    }
}

#[tokio::test]
async fn health_check_is_always_ok() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(None), buffer).await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn push_handshake_always_returns_203() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(None), buffer).await;

    let resp = reqwest::get(format!("http://{addr}/htopology/v1/")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 203);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["resultcode"], "203");
    assert_eq!(body["msg"], "welcome to the topology");
}

/// S1: empty buffer falls back to the configured default peer.
#[tokio::test]
async fn fetch_falls_back_to_default_peer_on_empty_buffer() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(Some("d.example:9000")), buffer).await;

    let resp = reqwest::get(format!("http://{addr}/htopology/v1/fetch/?magic=1")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    let producers = body["Producers"].as_array().unwrap();
    assert_eq!(producers.len(), 1);
    assert_eq!(producers[0]["addr"], "d.example");
    assert_eq!(producers[0]["port"], 9000);
}

/// S2: a populated buffer is drained in insertion order and emptied.
#[tokio::test]
async fn fetch_drains_buffer_in_insertion_order() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    buffer.try_push(Producer { addr: "1.2.3.4".to_string(), port: 3001, valency: 1 });
    buffer.try_push(Producer { addr: "5.6.7.8".to_string(), port: 3001, valency: 1 });
    let addr = spawn_server(settings(Some("d.example:9000")), buffer.clone()).await;

    let resp =
        reqwest::get(format!("http://{addr}/htopology/v1/fetch/?magic=1&max=5")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    let producers = body["Producers"].as_array().unwrap();
    assert_eq!(producers.len(), 2);
    assert_eq!(producers[0]["addr"], "1.2.3.4");
    assert_eq!(producers[1]["addr"], "5.6.7.8");

    // Buffer now empty; a follow-up fetch falls back to the default peer.
    let resp = reqwest::get(format!("http://{addr}/htopology/v1/fetch/?magic=1")).await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["Producers"].as_array().unwrap()[0]["addr"], "d.example");
}

/// S3: wrong magic is rejected.
#[tokio::test]
async fn fetch_rejects_wrong_magic() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(None), buffer).await;

    let resp = reqwest::get(format!("http://{addr}/htopology/v1/fetch/?magic=2")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

/// S4: out-of-range max is rejected.
#[tokio::test]
async fn fetch_rejects_max_out_of_range() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(None), buffer).await;

    let resp =
        reqwest::get(format!("http://{addr}/htopology/v1/fetch/?magic=1&max=99")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fetch_rejects_missing_magic() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(None), buffer).await;

    let resp = reqwest::get(format!("http://{addr}/htopology/v1/fetch/")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

/// With no default peer configured, an empty buffer yields an empty list
/// rather than a fabricated producer.
#[tokio::test]
async fn fetch_returns_empty_producers_without_default_peer() {
    let buffer = Arc::new(ProducerBuffer::new(10));
    let addr = spawn_server(settings(None), buffer).await;

    let resp = reqwest::get(format!("http://{addr}/htopology/v1/fetch/?magic=1")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["Producers"].as_array().unwrap().is_empty());
}
