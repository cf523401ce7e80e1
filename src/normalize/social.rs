use serde_json::Value;

use super::text::{escape_html, format_count};
use super::{
    MediaEntry, MediaKind, NormalizedResult, ResultKind, first_str, is_truthy, str_at,
    truthy_field,
};

const PHOTO_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "heic"];

pub fn instagram(payload: &Value) -> Result<NormalizedResult, String> {
    let data = truthy_field(payload, "data").ok_or("Instagram data not found.")?;

    let username =
        first_str(data, &["/username", "/metadata/username"]).unwrap_or_else(|| "-".into());
    let likes = format_count(
        truthy_field(data, "likeCount").or_else(|| data.pointer("/metadata/likeCount")),
    );
    let title = str_at(data, "/metadata/title");
    let caption = format!(
        "{}\nBy @{username}\n{likes} Likes",
        title.as_deref().unwrap_or("(Untitled)")
    );

    let mut video_url = str_at(data, "/videoUrls/0/url");
    let mut photo_urls = Vec::new();

    if video_url.is_none()
        && let Some(slides) = data.get("slides").and_then(Value::as_array)
    {
        for slide in slides {
            let media = slide.get("mediaUrls").and_then(Value::as_array);
            for item in media.into_iter().flatten() {
                let Some(url) = str_at(item, "/url") else {
                    continue;
                };
                let ext = item
                    .get("ext")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if ext == "mp4" {
                    if video_url.is_none() {
                        video_url = Some(url);
                    }
                } else if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
                    photo_urls.push(url);
                }
            }
            if video_url.is_some() {
                break;
            }
        }
    }

    let thumbnail = str_at(data, "/thumbnail");
    if let Some(video_url) = video_url {
        let thumbnail = thumbnail.or_else(|| Some(video_url.clone()));
        return Ok(
            NormalizedResult::single(video_url, MediaKind::Video, caption)
                .with_thumbnail(thumbnail)
                .with_title(title),
        );
    }

    // An empty carousel is left for post-validation to reject.
    let thumbnail = photo_urls.first().cloned();
    let media = photo_urls
        .into_iter()
        .map(|url| MediaEntry::typed(url, MediaKind::Image))
        .collect();
    Ok(NormalizedResult::new(ResultKind::Photo, media, caption)
        .with_thumbnail(thumbnail)
        .with_title(title))
}

pub fn tiktok(payload: &Value) -> Result<NormalizedResult, String> {
    let data = truthy_field(payload, "data").ok_or("TikTok data not found.")?;
    let video_url = str_at(data, "/play").ok_or("Video URL not found.")?;

    let username = str_at(data, "/author/unique_id").unwrap_or_else(|| "-".into());
    let views = format_count(data.get("play_count"));
    let title = str_at(data, "/title");
    let caption = format!(
        "<b>{}</b>\nBy <a href=\"https://www.tiktok.com/@{username}\">@{username}</a>\n{views} Views",
        escape_html(title.as_deref().unwrap_or("(Untitled)"))
    );

    Ok(NormalizedResult::single(video_url, MediaKind::Video, caption)
        .with_thumbnail(first_str(data, &["/cover", "/origin_cover"]))
        .with_title(title))
}

pub fn twitter(payload: &Value) -> Result<NormalizedResult, String> {
    let result = truthy_field(payload, "result").ok_or("Twitter data not found.")?;

    let (video_url, quality) = [("/HD/url", "HD"), ("/SEMI_HD/url", "SEMI HD"), ("/SD/url", "SD")]
        .into_iter()
        .find_map(|(pointer, quality)| str_at(result, pointer).map(|url| (url, quality)))
        .ok_or("Video URL not found.")?;

    let title = str_at(payload, "/title");
    let caption = format!(
        "Twitter Downloader\n\n<b>Title:</b> {}\n<b>Quality:</b> {quality}",
        escape_html(title.as_deref().unwrap_or("(Untitled)"))
    );

    Ok(NormalizedResult::single(video_url, MediaKind::Video, caption).with_title(title))
}

pub fn douyin(payload: &Value) -> Result<NormalizedResult, String> {
    let video_url =
        str_at(payload, "/result/result/download/no_watermark").ok_or("Video URL not found.")?;
    let title = str_at(payload, "/result/result/title");
    let caption = format!(
        "Douyin Downloader\n\n<b>Title:</b> {}",
        escape_html(title.as_deref().unwrap_or("(Untitled)"))
    );

    Ok(NormalizedResult::single(video_url, MediaKind::Video, caption).with_title(title))
}

pub fn snackvideo(payload: &Value) -> Result<NormalizedResult, String> {
    let video_url = str_at(payload, "/result/video/downloadUrl").ok_or("Video URL not found.")?;
    Ok(NormalizedResult::single(
        video_url,
        MediaKind::Video,
        "*SnackVideo Downloader*",
    ))
}

/// `result` is a single video URL, or an array of photo URLs.
pub fn threads(payload: &Value) -> Result<NormalizedResult, String> {
    let result = truthy_field(payload, "result")
        .filter(|_| is_truthy(payload.get("success")))
        .ok_or("Media not found.")?;

    match result {
        Value::String(url) => Ok(NormalizedResult::single(
            url.trim(),
            MediaKind::Video,
            "Threads Media",
        )),
        Value::Array(urls) => {
            let media = urls
                .iter()
                .filter_map(Value::as_str)
                .map(|url| MediaEntry::typed(url, MediaKind::Image))
                .collect();
            Ok(NormalizedResult::new(ResultKind::Photo, media, "Threads Media"))
        }
        _ => Err("No media available.".into()),
    }
}

pub fn facebook(payload: &Value) -> Result<NormalizedResult, String> {
    if !is_truthy(payload.get("success")) {
        return Err("Failed to fetch Facebook data.".into());
    }
    let data = truthy_field(payload, "data").unwrap_or(payload);

    let video_url =
        first_str(data, &["/hd", "/sd", "/url", "/video_url"]).ok_or("Video URL not found.")?;
    let title = first_str(data, &["/title", "/caption"]);
    let caption = format!(
        "Facebook Video\n{}",
        title.as_deref().unwrap_or("Video")
    );

    Ok(NormalizedResult::single(video_url, MediaKind::Video, caption)
        .with_thumbnail(str_at(data, "/thumbnail"))
        .with_title(title))
}
