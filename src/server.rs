use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderValue, Method, header::CONTENT_DISPOSITION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    config::{Config, normalize_origin},
    error::{ApiError, ProxyError},
    fetch::{FetchedMedia, MediaFetcher},
    normalize::MediaKind,
    platform::supported_platform_names,
    proxy::{ProxyOutcome, ShortlinkProxy},
};

/// Every surfaced item is labelled with the same nominal resolution.
const MEDIA_RESOLUTION: &str = "HD";

#[derive(Clone)]
pub struct AppState {
    pub fetcher: MediaFetcher,
    pub proxy: ShortlinkProxy,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let api_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|error| ApiError::internal(format!("Could not build HTTP client: {error}")))?;
        // No total timeout here: relays stream for as long as the upstream
        // keeps sending. A stalled body still fails after `read_timeout`.
        let relay_client = reqwest::Client::builder()
            .connect_timeout(config.upstream_timeout)
            .read_timeout(config.upstream_timeout)
            .build()
            .map_err(|error| ApiError::internal(format!("Could not build HTTP client: {error}")))?;

        Ok(Self {
            fetcher: MediaFetcher::new(
                api_client,
                config.downloader_api_base.clone(),
                config.api_key.clone(),
            ),
            proxy: ShortlinkProxy::new(
                relay_client,
                config.shortlink_endpoint.clone(),
                config.upstream_timeout,
            ),
            started_at: Instant::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct DownloadResponse {
    success: bool,
    data: DownloadData,
}

#[derive(Debug, Serialize)]
struct DownloadData {
    media: Vec<ClientMediaItem>,
    preview: String,
    caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClientMediaItem {
    url: String,
    #[serde(rename = "type")]
    kind: MediaKind,
    resolution: &'static str,
}

impl From<FetchedMedia> for DownloadResponse {
    fn from(fetched: FetchedMedia) -> Self {
        let media = fetched
            .media
            .into_iter()
            .map(|item| ClientMediaItem {
                url: item.url,
                kind: item.kind,
                resolution: MEDIA_RESOLUTION,
            })
            .collect();

        Self {
            success: true,
            data: DownloadData {
                media,
                preview: fetched.thumbnail,
                caption: fetched.caption,
                filename: fetched.filename,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    send: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: &'static str,
    api_key_configured: bool,
    platforms: Vec<&'static str>,
    server_time: chrono::DateTime<Utc>,
    uptime_seconds: u64,
}

pub fn router(state: AppState, config: &Config) -> Router {
    let public_dir = ServeDir::new(&config.public_dir);

    Router::new()
        .route("/api/download", post(download))
        .route("/api/config", get(status))
        .route("/proxy/get.php", get(shortlink_proxy))
        .fallback_service(public_dir)
        .with_state(state)
        .layer(build_cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        api_key_configured: state.fetcher.has_api_key(),
        platforms: supported_platform_names(),
        server_time: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let payload = payload.map_err(|rejection| {
        debug!("Rejected download body: {rejection}");
        ApiError::bad_request("A URL is required.")
    })?;
    let url = payload
        .0
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("A URL is required."))?
        .to_string();

    let request_id = Uuid::new_v4();
    let span = info_span!("download", %request_id);
    async move {
        info!("Downloading {url:?}");
        match state.fetcher.fetch(&url).await {
            Ok(fetched) => {
                info!(
                    "Found {} {} media item(s)",
                    fetched.media.len(),
                    fetched.platform.name()
                );
                Ok(Json(DownloadResponse::from(fetched)))
            }
            Err(error) => {
                warn!("Download failed: {error}");
                Err(ApiError::from(error))
            }
        }
    }
    .instrument(span)
    .await
}

async fn shortlink_proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ProxyError> {
    let outcome: ProxyOutcome = state
        .proxy
        .resolve(query.send.as_deref(), query.source.as_deref())
        .await?;
    Ok(outcome.into_response())
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION]);

    if allowed_origins.is_empty() {
        warn!("ALLOWED_ORIGINS is not configured. Any origin will be allowed.");
        return layer.allow_origin(Any);
    }

    info!(
        "CORS allow-list loaded with {} origin(s): {:?}",
        allowed_origins.len(),
        allowed_origins
    );
    let allowed_origins: Arc<[String]> = allowed_origins.into();
    layer.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _| {
            let normalized = origin.to_str().ok().and_then(normalize_origin);
            let allowed = normalized
                .as_ref()
                .is_some_and(|value| allowed_origins.contains(value));
            debug!(
                "CORS origin check raw={:?} normalized={:?} allowed={}",
                origin, normalized, allowed
            );
            allowed
        },
    ))
}
