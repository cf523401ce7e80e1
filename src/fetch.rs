//! Download pipeline: detect the platform, call the downloader API once,
//! normalize its answer and verify that media was actually found.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::DownloadError,
    normalize::{MediaItem, NormalizedResult, ResultKind, canonicalize_media, normalizer_for},
    platform::{Platform, PlatformRule, detect_platform},
};

const DEFAULT_CAPTION: &str = "Media";
const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub platform: Platform,
    pub kind: ResultKind,
    pub media: Vec<MediaItem>,
    pub caption: String,
    pub thumbnail: String,
    /// Suggested download name, only known for file-host platforms.
    pub filename: Option<String>,
}

#[derive(Clone)]
pub struct MediaFetcher {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl MediaFetcher {
    /// `client` is expected to carry the upstream timeout.
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn upstream_url(&self, rule: &PlatformRule, url: &str, api_key: &str) -> String {
        format!(
            "{}/{}?link={}&apikey={}",
            self.api_base,
            rule.endpoint_path,
            urlencoding::encode(url),
            urlencoding::encode(api_key)
        )
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedMedia, DownloadError> {
        let rule = detect_platform(url).ok_or(DownloadError::UnsupportedPlatform)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DownloadError::MissingApiKey)?;

        info!("Fetching {} media", rule.platform.name());
        let request_url = self.upstream_url(rule, url, api_key);
        let response = self.client.get(&request_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Downloader API answered {status} for {}", rule.platform.name());
            return Err(DownloadError::UpstreamHttp(status.as_u16()));
        }

        let body = response.text().await?;
        let payload = parse_upstream_body(&body)?;

        let normalized = normalizer_for(rule.platform)(&payload).map_err(|reason| {
            debug!("{} normalizer rejected payload: {reason}", rule.platform.name());
            DownloadError::Normalizer(reason)
        })?;

        finalize(rule.platform, normalized)
    }
}

/// Never hands an HTML error page to a normalizer.
pub fn parse_upstream_body(body: &str) -> Result<Value, DownloadError> {
    serde_json::from_str(body).map_err(|error| {
        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        warn!("Downloader API response is not JSON ({error}): {preview:?}");
        DownloadError::UpstreamInvalidJson
    })
}

/// Post-validation. The media list decides whether anything was found,
/// regardless of what the normalizer reported.
pub fn finalize(
    platform: Platform,
    normalized: NormalizedResult,
) -> Result<FetchedMedia, DownloadError> {
    let media = canonicalize_media(normalized.media);
    let first = media.first().ok_or(DownloadError::NoMediaFound)?;

    let thumbnail = normalized
        .thumbnail
        .filter(|thumbnail| !thumbnail.trim().is_empty())
        .unwrap_or_else(|| first.url.clone());
    let caption = normalized
        .caption
        .filter(|caption| !caption.is_empty())
        .or(normalized.title.filter(|title| !title.is_empty()))
        .unwrap_or_else(|| DEFAULT_CAPTION.to_string());

    Ok(FetchedMedia {
        platform,
        kind: normalized.kind,
        media,
        caption,
        thumbnail,
        filename: normalized.filename,
    })
}
