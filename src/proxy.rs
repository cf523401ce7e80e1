//! Shortlink proxy with a raw relay fallback.
//!
//! The shortlink service refuses links whose content type it cannot classify.
//! For those, the original link is fetched directly and piped to the caller
//! as a video stream.

use std::{sync::LazyLock, time::Duration};

use axum::{
    body::Body,
    http::{
        HeaderValue,
        header::{CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use regex::Regex;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::error::ProxyError;

pub const DEFAULT_RELAY_CONTENT_TYPE: &str = "video/mp4";
const RELAY_CONTENT_DISPOSITION: &str = "inline; filename=\"video.mp4\"";

static RELAYABLE_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)wrong type of the web page content|not a valid video file")
        .expect("valid regex")
});

#[derive(Debug)]
pub enum ProxyOutcome {
    /// The shortlink service's answer, forwarded verbatim.
    Json(Value),
    /// Streamed body of the original link.
    Relay(Response),
}

impl IntoResponse for ProxyOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Json(value) => axum::Json(value).into_response(),
            Self::Relay(response) => response,
        }
    }
}

#[derive(Clone)]
pub struct ShortlinkProxy {
    client: reqwest::Client,
    endpoint: String,
    deadline: Duration,
}

impl ShortlinkProxy {
    /// `client` must not carry a total request timeout, or long relays would
    /// be cut off mid-stream; a per-read timeout is fine. `deadline` bounds
    /// each hop up to its headers.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, deadline: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            deadline,
        }
    }

    pub async fn resolve(
        &self,
        send: Option<&str>,
        source: Option<&str>,
    ) -> Result<ProxyOutcome, ProxyError> {
        let send = send
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ProxyError::MissingSend)?;

        let payload = self.query_shortlink(send, source.unwrap_or_default()).await?;

        if is_relayable_error(&payload) {
            warn!("Shortlink service could not classify {send:?}, relaying raw content");
            return self.relay(send).await.map(ProxyOutcome::Relay);
        }

        Ok(ProxyOutcome::Json(payload))
    }

    async fn query_shortlink(&self, send: &str, source: &str) -> Result<Value, ProxyError> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("send", send), ("source", source)])
            .send();

        let text = timeout(self.deadline, async { request.await?.text().await })
            .await
            .map_err(|_| ProxyError::ShortlinkUpstream("request timed out".to_string()))?
            .map_err(|error| {
                error!("Shortlink request failed: {error}");
                ProxyError::ShortlinkUpstream(error.without_url().to_string())
            })?;

        serde_json::from_str(&text).map_err(|error| {
            warn!("Shortlink response is not JSON: {error}");
            ProxyError::ShortlinkUpstream("invalid (non-JSON) response".to_string())
        })
    }

    async fn relay(&self, send: &str) -> Result<Response, ProxyError> {
        let upstream = timeout(self.deadline, self.client.get(send).send())
            .await
            .map_err(|_| ProxyError::RelayFetch("request timed out".to_string()))?
            .map_err(|error| {
                error!("Relay fetch failed: {error}");
                ProxyError::RelayFetch(error.without_url().to_string())
            })?;

        let status = upstream.status();
        if !status.is_success() {
            return Err(ProxyError::RelayFetch(format!(
                "upstream answered HTTP {}",
                status.as_u16()
            )));
        }

        let content_type = upstream
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_RELAY_CONTENT_TYPE));
        // Bytes pass through undecoded, so the length only holds together with
        // the upstream encoding.
        let content_length = upstream.headers().get(CONTENT_LENGTH).cloned();
        let content_encoding = upstream.headers().get(CONTENT_ENCODING).cloned();

        info!("Relaying {send:?} as {content_type:?}");
        let stream = upstream.bytes_stream().inspect_err(|error| {
            error!("Relay stream aborted: {error}");
        });

        let mut response = Body::from_stream(stream).into_response();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(RELAY_CONTENT_DISPOSITION),
        );
        if let Some(length) = content_length {
            headers.insert(CONTENT_LENGTH, length);
        }
        if let Some(encoding) = content_encoding {
            headers.insert(CONTENT_ENCODING, encoding);
        }

        Ok(response)
    }
}

fn is_relayable_error(payload: &Value) -> bool {
    let is_error = payload.get("status").and_then(Value::as_str) == Some("error");
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    is_error && RELAYABLE_ERROR.is_match(message)
}
