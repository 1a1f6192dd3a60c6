use axum::Router;
use std::{io, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    handlers::{self, AppState},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::relay_asset)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and relays until SIGINT or SIGTERM.
pub async fn serve(config: Arc<AppConfig>) -> io::Result<()> {
    let app = router(AppState::from_config(&config));

    let listener = TcpListener::bind(config.socket_addr()).await?;
    info!(
        "Asset relay listening on {} forwarding to {}",
        listener.local_addr()?,
        config.upstream_url
    );

    debug!("Starting server with graceful shutdown");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler")
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            debug!("CTRL+C signal received");
        },
        _ = terminate => {
            debug!("Terminate signal received");
        },
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
