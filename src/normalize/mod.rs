//! Per-platform response normalizers.
//!
//! Every upstream endpoint answers with its own JSON layout. The functions in
//! the submodules map those layouts onto [`NormalizedResult`]; [`normalizer_for`]
//! is the only dispatch point and is exhaustive over [`Platform`].

mod audio;
mod files;
mod social;
pub mod text;
mod video;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::platform::Platform;

/// Kind of the whole result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Video,
    Photo,
    Audio,
    Document,
}

/// Kind of a single media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    Audio,
    Document,
}

impl MediaKind {
    /// Extension sniffing cannot tell audio or documents apart, so it only
    /// ever yields video or image.
    pub fn infer(url: &str) -> Self {
        if url.contains(".mp4") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// A media entry as produced by a normalizer, before canonicalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MediaEntry {
    Bare(String),
    Item {
        #[serde(default)]
        url: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<MediaKind>,
    },
}

impl MediaEntry {
    pub fn typed(url: impl Into<String>, kind: MediaKind) -> Self {
        Self::Item {
            url: Some(url.into()),
            kind: Some(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub kind: ResultKind,
    pub media: Vec<MediaEntry>,
    pub caption: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub filename: Option<String>,
}

impl NormalizedResult {
    pub fn new(kind: ResultKind, media: Vec<MediaEntry>, caption: impl Into<String>) -> Self {
        Self {
            kind,
            media,
            caption: Some(caption.into()),
            title: None,
            thumbnail: None,
            filename: None,
        }
    }

    pub fn single(url: impl Into<String>, kind: MediaKind, caption: impl Into<String>) -> Self {
        let result_kind = match kind {
            MediaKind::Video => ResultKind::Video,
            MediaKind::Image => ResultKind::Photo,
            MediaKind::Audio => ResultKind::Audio,
            MediaKind::Document => ResultKind::Document,
        };
        Self::new(result_kind, vec![MediaEntry::typed(url, kind)], caption)
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

pub type Normalizer = fn(&Value) -> Result<NormalizedResult, String>;

pub fn normalizer_for(platform: Platform) -> Normalizer {
    match platform {
        Platform::Instagram => social::instagram,
        Platform::TikTok => social::tiktok,
        Platform::Twitter => social::twitter,
        Platform::Douyin => social::douyin,
        Platform::SnackVideo => social::snackvideo,
        Platform::MediaFire => files::mediafire,
        Platform::SoundCloud => audio::soundcloud,
        Platform::Threads => social::threads,
        Platform::Xvideos => video::xvideos,
        Platform::Spotify => audio::spotify,
        Platform::YouTube => video::youtube,
        Platform::Facebook => social::facebook,
    }
}

/// Turns normalizer entries into canonical items. Entries without a usable
/// absolute URL are dropped; missing kinds are inferred from the URL.
pub fn canonicalize_media(entries: Vec<MediaEntry>) -> Vec<MediaItem> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let (url, kind) = match entry {
                MediaEntry::Bare(url) => (url, None),
                MediaEntry::Item { url, kind } => (url?, kind),
            };
            let url = url.trim().to_string();
            if url.is_empty() || !is_absolute_url(&url) {
                return None;
            }
            let kind = kind.unwrap_or_else(|| MediaKind::infer(&url));
            Some(MediaItem { url, kind })
        })
        .collect()
}

fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|parsed| parsed.has_host())
}

/// First non-empty string among the given JSON pointers.
pub(crate) fn first_str(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|pointer| str_at(value, pointer))
}

pub(crate) fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

/// `value[key]`, unless it is missing or falsy.
pub(crate) fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|field| is_truthy(Some(*field)))
}

/// JavaScript-style truthiness, used for upstream `success` flags and root
/// objects.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_strings_infer_kind_from_extension() {
        let items = canonicalize_media(vec![
            MediaEntry::Bare("https://x/y.mp4".into()),
            MediaEntry::Bare("https://x/y.jpg".into()),
        ]);
        assert_eq!(items[0].kind, MediaKind::Video);
        assert_eq!(items[1].kind, MediaKind::Image);
    }

    #[test]
    fn explicit_kinds_are_kept_and_missing_ones_inferred() {
        let items = canonicalize_media(vec![
            MediaEntry::typed("https://cdn.example/track", MediaKind::Audio),
            MediaEntry::Item {
                url: Some("https://cdn.example/clip.mp4?sig=1".into()),
                kind: None,
            },
        ]);
        assert_eq!(
            items,
            vec![
                MediaItem {
                    url: "https://cdn.example/track".into(),
                    kind: MediaKind::Audio,
                },
                MediaItem {
                    url: "https://cdn.example/clip.mp4?sig=1".into(),
                    kind: MediaKind::Video,
                },
            ]
        );
    }

    #[test]
    fn empty_missing_and_relative_urls_are_dropped() {
        let items = canonicalize_media(vec![
            MediaEntry::Bare(String::new()),
            MediaEntry::Bare("   ".into()),
            MediaEntry::Item {
                url: None,
                kind: Some(MediaKind::Video),
            },
            MediaEntry::Bare("/relative/path.mp4".into()),
            MediaEntry::Bare("https://cdn.example/ok.png".into()),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://cdn.example/ok.png");
    }

    #[test]
    fn entries_deserialize_from_strings_or_objects() {
        let entries: Vec<MediaEntry> = serde_json::from_value(json!([
            "https://a.example/1.mp4",
            {"url": "https://a.example/2.jpg", "type": "image"},
            {"url": "https://a.example/3"}
        ]))
        .unwrap();
        let items = canonicalize_media(entries);
        assert_eq!(
            items.iter().map(|item| item.kind).collect::<Vec<_>>(),
            vec![MediaKind::Video, MediaKind::Image, MediaKind::Image]
        );
    }

    #[test]
    fn truthiness_matches_upstream_flags() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!({}))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(None));
    }
}
