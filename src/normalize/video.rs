use serde_json::Value;

use super::text::escape_markdown;
use super::{MediaKind, NormalizedResult, first_str, str_at, truthy_field};

pub fn xvideos(payload: &Value) -> Result<NormalizedResult, String> {
    let video_url = first_str(payload, &["/result/videos/high", "/result/videos/low"])
        .ok_or("Video URL not found.")?;
    Ok(
        NormalizedResult::single(video_url, MediaKind::Video, "Xvideos Media")
            .with_thumbnail(str_at(payload, "/result/thumbnail"))
            .with_title(str_at(payload, "/result/title")),
    )
}

/// The upstream repeats links in `dlink`; the first distinct one is used.
pub fn youtube(payload: &Value) -> Result<NormalizedResult, String> {
    let data = truthy_field(payload, "data").ok_or("YouTube data not found.")?;

    let mut links: Vec<&str> = Vec::new();
    for link in data
        .get("dlink")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        if !link.is_empty() && !links.contains(&link) {
            links.push(link);
        }
    }
    let video_url = links.first().ok_or("Video link not found.")?.to_string();

    let title = str_at(data, "/title");
    let duration = str_at(data, "/duration").unwrap_or_else(|| "-".into());
    let caption = format!(
        "*MP4 Downloader*\n\n*Title:* {}\n*Duration:* `{}`",
        escape_markdown(title.as_deref().unwrap_or("(Untitled)")),
        escape_markdown(&duration)
    );

    Ok(NormalizedResult::single(video_url, MediaKind::Video, caption)
        .with_thumbnail(str_at(data, "/thumbnail"))
        .with_title(title))
}
