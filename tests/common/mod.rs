//! Shared helpers: a local object-storage stand-in and a relay bound to it.

use asset_relay::{
    config::AppConfig,
    handlers::AppState,
    server,
};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

pub const ASSET_LEN: usize = 2 * 1024 * 1024;
pub const NOT_FOUND_HTML: &str = "<!DOCTYPE html><html><body><h1>404 Not Found</h1></body></html>";

/// Deterministic stand-in for the model file.
pub fn asset_bytes() -> Vec<u8> {
    (0..ASSET_LEN).map(|i| (i % 251) as u8).collect()
}

/// Parses `bytes=start-end` and `bytes=start-`. Suffix ranges are not needed here.
fn parse_range(value: &str, len: usize) -> Option<(usize, usize)> {
    let bounds = value.strip_prefix("bytes=")?;
    let (start, end) = bounds.split_once('-')?;
    let start: usize = start.parse().ok()?;
    let end = if end.is_empty() {
        len - 1
    } else {
        end.parse::<usize>().ok()?.min(len - 1)
    };
    (start <= end).then_some((start, end))
}

async fn asset(headers: HeaderMap) -> Response {
    let data = asset_bytes();
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_range(v, data.len()));

    match range {
        Some((start, end)) => (
            StatusCode::PARTIAL_CONTENT,
            [
                (header::CONTENT_TYPE, "model/gltf-binary".to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, data.len())),
            ],
            data[start..=end].to_vec(),
        )
            .into_response(),
        None => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "model/gltf-binary".to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            data,
        )
            .into_response(),
    }
}

async fn missing() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html")],
        NOT_FOUND_HTML,
    )
        .into_response()
}

/// Reports back which request headers reached the upstream.
async fn echo_headers(headers: HeaderMap) -> Response {
    let seen = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    (
        StatusCode::OK,
        [
            ("x-seen-host", seen("host")),
            ("x-seen-origin", seen("origin")),
            ("x-seen-range", seen("range")),
            ("x-seen-keep-alive", seen("keep-alive")),
        ],
    )
        .into_response()
}

pub async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/robot.glb", get(asset))
        .route("/missing.glb", get(missing))
        .route("/echo", get(echo_headers));

    spawn(app).await
}

/// Starts a relay in front of `upstream_url` and returns its address.
pub async fn spawn_relay(upstream_url: &str) -> SocketAddr {
    let url = Url::parse(upstream_url).unwrap();
    let state = AppState::from_config(&AppConfig::new(url));
    spawn(server::router(state)).await
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
