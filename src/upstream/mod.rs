use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Response},
};
use futures_util::TryStreamExt;
use tracing::{debug, error};
use url::Url;

use crate::error::RelayError;

mod client;
pub use client::CLIENT;

/// Issues the outbound request for a relayed call.
///
/// The relay only ever talks to one upstream object, so implementations own
/// the target and take just the method and the headers to forward. Network
/// level failures come back as [`RelayError::UpstreamUnreachable`]; any HTTP
/// response, whatever its status, is `Ok`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, method: Method, headers: HeaderMap) -> Result<Response<Body>, RelayError>;
}

/// [`Fetcher`] backed by the shared pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpFetcher {
    pub fn new(url: Url) -> Self {
        Self {
            client: CLIENT.clone(),
            url,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, method: Method, headers: HeaderMap) -> Result<Response<Body>, RelayError> {
        debug!(method = %method, url = %self.url, "Sending upstream request");

        let response = self
            .client
            .request(method, self.url.clone())
            .headers(headers)
            .send()
            .await?;

        debug!(status = %response.status(), "Upstream responded");
        Ok(into_streaming_response(response))
    }
}

/// Re-wraps an upstream response without reading its body.
fn into_streaming_response(response: reqwest::Response) -> Response<Body> {
    let status = response.status();
    let headers = response.headers().clone();

    let stream = response.bytes_stream().inspect_err(|e| {
        error!("Upstream stream error: {}", e);
    });

    let mut relayed = Response::new(Body::from_stream(stream));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;
    relayed
}
