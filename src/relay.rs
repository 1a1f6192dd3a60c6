//! The relay itself: method gate, header forwarding, and the three ways an
//! upstream answer is turned into the caller's response.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{error::RelayError, upstream::Fetcher};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Range";

/// Headers scoped to a single connection (RFC 9110 §7.6.1). Never forwarded in
/// either direction.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_allowed(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Relays one request. Never fails: every error is rendered as a response.
pub async fn handle<F>(fetcher: &F, request: Request<Body>) -> Response
where
    F: Fetcher + ?Sized,
{
    match relay(fetcher, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn relay<F>(fetcher: &F, request: Request<Body>) -> Result<Response, RelayError>
where
    F: Fetcher + ?Sized,
{
    let method = request.method().clone();
    if !is_allowed(&method) {
        debug!(method = %method, "Rejecting method");
        return Err(RelayError::MethodNotAllowed);
    }

    let headers = forwardable_headers(request.headers());
    debug!(
        method = %method,
        path = %request.uri().path(),
        range = ?headers.get(header::RANGE),
        "Relaying request"
    );

    let upstream = fetcher.fetch(method, headers).await?;
    let status = upstream.status();

    if !status.is_success() {
        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        let body = to_bytes(upstream.into_body(), usize::MAX)
            .await
            .map_err(RelayError::unreachable)?;

        debug!(status = %status, bytes = body.len(), "Passing upstream error through");
        return Err(RelayError::UpstreamStatus {
            status,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    let (mut parts, body) = upstream.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    apply_cors_headers(&mut parts.headers);

    Ok(Response::from_parts(parts, body))
}

/// The inbound header set minus `Host` and hop-by-hop headers. The outbound
/// client addresses the upstream by its own authority. `Content-Length` goes
/// too since the inbound body is never sent.
pub fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    strip_hop_by_hop(&mut headers);
    headers
}

/// Removes hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Sets the three CORS headers, replacing whatever upstream sent for them.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}
