use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};
use std::sync::Arc;
use crate::{
    config::AppConfig,
    relay,
    upstream::{Fetcher, HttpFetcher},
};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn Fetcher>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(HttpFetcher::new(config.upstream_url.clone())))
    }
}

/// Catch-all handler: every path and method lands here.
pub async fn relay_asset(State(state): State<AppState>, request: Request<Body>) -> Response {
    relay::handle(state.fetcher.as_ref(), request).await
}
