use std::{collections::HashSet, path::PathBuf, time::Duration};

use url::Url;

pub const DEFAULT_DOWNLOADER_API_BASE: &str = "https://api.ferdev.my.id/downloader";
pub const DEFAULT_SHORTLINK_ENDPOINT: &str = "https://shtl.pw/getmylink/get.php";
const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 15;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub downloader_api_base: String,
    pub shortlink_endpoint: String,
    pub upstream_timeout: Duration,
    pub bind_addr: String,
    pub public_dir: PathBuf,
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let api_key = read_string_env("DOWNLOADER_API_KEY").or_else(|| read_string_env("API_KEY"));
        let upstream_timeout = read_u64_env("UPSTREAM_TIMEOUT_SECONDS")
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECONDS);

        let allowed_origins = read_string_env("ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(|origin| {
                        normalize_origin(origin).ok_or_else(|| {
                            format!(
                                "Invalid origin in ALLOWED_ORIGINS: {origin}. Use values like https://example.com"
                            )
                        })
                    })
                    .collect::<Result<HashSet<_>, _>>()
            })
            .transpose()?
            .map(|origins| origins.into_iter().collect::<Vec<_>>())
            .unwrap_or_default();

        Ok(Self {
            api_key,
            downloader_api_base: read_string_env("DOWNLOADER_API_BASE")
                .unwrap_or_else(|| DEFAULT_DOWNLOADER_API_BASE.to_string()),
            shortlink_endpoint: read_string_env("SHORTLINK_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_SHORTLINK_ENDPOINT.to_string()),
            upstream_timeout: Duration::from_secs(upstream_timeout),
            bind_addr: resolve_bind_addr(),
            public_dir: read_string_env("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR)),
            allowed_origins,
        })
    }
}

fn read_string_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .and_then(|value| non_empty(&value).map(ToString::to_string))
}

fn read_u64_env(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn resolve_bind_addr() -> String {
    if let Some(configured) = read_string_env("APP_ADDR") {
        return configured;
    }

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    format!("0.0.0.0:{port}")
}

/// `scheme://host[:port]` with default ports dropped; anything carrying a
/// path, query or fragment is rejected.
pub fn normalize_origin(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let scheme = parsed.scheme();
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };

    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return None;
    }

    match parsed.port() {
        Some(port) if port != default_port => Some(format!("{scheme}://{host}:{port}")),
        _ => Some(format!("{scheme}://{host}")),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
