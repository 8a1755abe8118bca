//! `CompatibilityServer`: the legacy-compatible HTTP topology API.
//!
//! Routes mirror the upstream directory service this relay replaces:
//! `GET /health`, `GET /htopology/v1/` (push handshake, always 203), and
//! `GET /htopology/v1/fetch/` (pull, draws from the [`ProducerBuffer`]).

use crate::buffer::ProducerBuffer;
use crate::config::ServerSettings;
use crate::model::{FetchQuery, FetchRequest, Producer, PullResponse, PushResponse};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub buffer: Arc<ProducerBuffer>,
    pub settings: ServerSettings,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/htopology/v1/", get(push_handshake))
        .route("/htopology/v1/fetch/", get(fetch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| peer.ip().to_string())
}

fn now_string() -> String {
    humantime::format_rfc3339_seconds(std::time::SystemTime::now()).to_string()
}

async fn push_handshake(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<PushResponse> {
    Json(PushResponse {
        resultcode: "203",
        datetime: now_string(),
        client_ip: client_ip(&headers, peer),
        iptype: 4,
        msg: "welcome to the topology",
    })
}

async fn fetch(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<FetchQuery>,
) -> Response {
    let request = match validate(&query, &state.settings) {
        Ok(r) => r,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let mut producers = state
        .buffer
        .drain_up_to(request.max, state.settings.read_timeout)
        .await;

    if producers.is_empty() {
        if let Some(fallback) = default_peer_producer(state.settings.default_peer.as_deref()).await {
            producers.push(fallback);
        }
    }

    Json(PullResponse {
        resultcode: "200",
        datetime: now_string(),
        client_ip: client_ip(&headers, peer),
        iptype: request.ip_version,
        msg: "welcome to the topology",
        producers,
    })
    .into_response()
}

fn validate(query: &FetchQuery, settings: &ServerSettings) -> Result<FetchRequest, ()> {
    let magic: i64 = query.magic.as_deref().and_then(|s| s.parse().ok()).ok_or(())?;
    if magic as u64 != settings.magic {
        return Err(());
    }

    let max: i64 = match &query.max {
        Some(s) => s.parse().map_err(|_| ())?,
        None => settings.max_peers as i64,
    };
    if !(1..=20).contains(&max) {
        return Err(());
    }

    let ip_version: i64 = match &query.ipv {
        Some(s) => s.parse().map_err(|_| ())?,
        None => 4,
    };
    if ip_version < 4 {
        return Err(());
    }

    Ok(FetchRequest { magic, max: max as usize, ip_version })
}

async fn default_peer_producer(default_peer: Option<&str>) -> Option<Producer> {
    let default_peer = default_peer?;
    let (host, port_str) = default_peer.rsplit_once(':')?;
    let port: u16 = port_str.parse().ok()?;

    let valency = match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => {
            let count = addrs.count() as u32;
            if count == 0 { 1 } else { count }
        }
        Err(_) => 1,
    };

    Some(Producer { addr: host.to_string(), port, valency })
}

/// Binds `listen_addr` and serves `app`. On `shutdown` resolving, the
/// server immediately stops accepting new connections and is given one
/// second to drain in-flight requests; if that deadline elapses, the
/// process is force-exited regardless of what's still in flight, mirroring
/// the upstream's `httpServer.Shutdown(timeout)` followed by an
/// unconditional `os.Exit(0)`.
pub async fn serve(
    listen_addr: &str,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "compatibility server listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => return res,
        _ = shutdown => {
            tracing::info!("shutdown signal received, draining in-flight requests");
            let _ = shutdown_tx.send(());
        }
    }

    match tokio::time::timeout(Duration::from_secs(1), server).await {
        Ok(res) => res,
        Err(_) => {
            tracing::warn!("graceful shutdown deadline elapsed, forcing exit");
            std::process::exit(0);
        }
    }
}
