use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the download pipeline, from detection to post-validation.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Unsupported platform.")]
    UnsupportedPlatform,

    #[error("Downloader API key is not configured on the server.")]
    MissingApiKey,

    #[error("Failed to reach the downloader API: {0}")]
    UpstreamUnreachable(String),

    #[error("Downloader API answered HTTP {0}.")]
    UpstreamHttp(u16),

    #[error("Downloader API returned an invalid (non-JSON) response.")]
    UpstreamInvalidJson,

    #[error("{0}")]
    Normalizer(String),

    #[error("No media found.")]
    NoMediaFound,
}

impl DownloadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedPlatform | Self::Normalizer(_) | Self::NoMediaFound => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingApiKey
            | Self::UpstreamUnreachable(_)
            | Self::UpstreamHttp(_)
            | Self::UpstreamInvalidJson => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::UpstreamUnreachable("request timed out".to_string())
        } else {
            Self::UpstreamUnreachable(error.without_url().to_string())
        }
    }
}

/// Failures of the shortlink proxy. Rendered in the shortlink service's own
/// `{status, message}` envelope.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing 'send' parameter.")]
    MissingSend,

    #[error("Failed to connect to get.php: {0}")]
    ShortlinkUpstream(String),

    #[error("Relay fallback failed: {0}")]
    RelayFetch(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSend => StatusCode::BAD_REQUEST,
            Self::ShortlinkUpstream(_) | Self::RelayFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProxyErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = Json(ProxyErrorBody {
            status: "error",
            message: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<DownloadError> for ApiError {
    fn from(error: DownloadError) -> Self {
        Self {
            status: error.status(),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
