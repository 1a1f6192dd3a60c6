use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way a relayed request can end without a streamed success body.
/// Each variant maps to exactly one HTTP response; none of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Upstream fetch failed: {0}")]
    UpstreamUnreachable(#[source] BoxError),

    /// Upstream answered, but not with a 2xx. The body is re-emitted as-is
    /// with the upstream status and content type, and without CORS headers.
    #[error("Upstream responded with status {status}")]
    UpstreamStatus {
        status: StatusCode,
        content_type: HeaderValue,
        body: String,
    },
}

impl RelayError {
    pub fn unreachable<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RelayError::UpstreamUnreachable(err.into())
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::unreachable(err)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            RelayError::UpstreamUnreachable(cause) => {
                // The cause stays in the logs; callers only get the fixed message.
                warn!(error = %cause, "Upstream fetch failed");
                (StatusCode::BAD_GATEWAY, "Upstream fetch failed").into_response()
            }
            RelayError::UpstreamStatus {
                status,
                content_type,
                body,
            } => (status, [(header::CONTENT_TYPE, content_type)], body).into_response(),
        }
    }
}
