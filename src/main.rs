use std::sync::Arc;
use tracing::{debug, error, info};

use asset_relay::{config::AppConfig, server, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    info!("Loading application configuration");
    let config = match AppConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    debug!(
        "Configuration loaded: host={}, port={}, upstream={}",
        config.host, config.port, config.upstream_url
    );

    if let Err(e) = server::serve(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
