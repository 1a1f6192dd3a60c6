use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use dotenv::dotenv;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("UPSTREAM_URL must be set")]
    MissingUpstream,

    #[error("UPSTREAM_URL is not a valid URL: {0}")]
    InvalidUpstream(#[from] url::ParseError),

    #[error("UPSTREAM_URL must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("PORT must be a number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),

    #[error("HOST must be an IP address: {0}")]
    InvalidHost(#[from] std::net::AddrParseError),
}

/// Startup configuration. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: IpAddr,
    /// The single object the relay re-serves.
    pub upstream_url: Url,
}

impl AppConfig {
    /// Config with the default bind address, for tests and embedding.
    pub fn new(upstream_url: Url) -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST,
            upstream_url,
        }
    }

    /// Reads `HOST`, `PORT` and `UPSTREAM_URL`, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_upstream = lookup("UPSTREAM_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingUpstream)?;
        let upstream_url = parse_upstream(raw_upstream.trim())?;

        let port = match lookup("PORT") {
            Some(port) => port.trim().parse()?,
            None => DEFAULT_PORT,
        };
        let host = match lookup("HOST") {
            Some(host) => host.trim().parse()?,
            None => DEFAULT_HOST,
        };

        Ok(Self {
            port,
            host,
            upstream_url,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_upstream(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
