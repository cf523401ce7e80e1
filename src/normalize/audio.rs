use serde_json::Value;

use super::text::escape_html;
use super::{MediaKind, NormalizedResult, str_at, truthy_field};

pub fn soundcloud(payload: &Value) -> Result<NormalizedResult, String> {
    let download = str_at(payload, "/result/downloadUrl").ok_or("Invalid SoundCloud data.")?;
    let title = str_at(payload, "/result/title").unwrap_or_else(|| "SoundCloud Audio".into());
    let artist = str_at(payload, "/result/author").unwrap_or_else(|| "Unknown Artist".into());

    let mut caption = format!(
        "SoundCloud Audio:\n{artist} - {title}.mp3\nBy: <b>{}</b>\nTitle: <i>{}</i>",
        escape_html(&artist),
        escape_html(&title)
    );
    if let Some(genre) = str_at(payload, "/result/genre") {
        caption.push_str(&format!("\nGenre: <i>{}</i>", escape_html(&genre)));
    }

    Ok(NormalizedResult::single(download, MediaKind::Audio, caption)
        .with_thumbnail(str_at(payload, "/result/thumbnail"))
        .with_title(Some(title)))
}

/// `download` is either a direct URL or a track list whose first entry wins.
pub fn spotify(payload: &Value) -> Result<NormalizedResult, String> {
    let data = truthy_field(payload, "data").ok_or("Spotify data not found.")?;
    let title = str_at(data, "/title");
    let artist = str_at(data, "/artist").unwrap_or_else(|| "(Unknown)".into());
    let thumbnail = str_at(data, "/thumbnail");
    let display_title = escape_html(title.as_deref().unwrap_or("(Untitled)"));

    let mut caption = format!(
        "Spotify Downloader\n\n<b>Title:</b> {display_title}\n<b>Artist:</b> {}\n",
        escape_html(&artist)
    );

    let audio_url = match payload.get("download") {
        Some(Value::String(url)) if !url.trim().is_empty() => {
            caption.push_str(&format!("<b>Download:</b> {display_title}"));
            url.trim().to_string()
        }
        Some(Value::Array(tracks)) => {
            let track = tracks.first().ok_or("Invalid Spotify format.")?;
            let url = str_at(track, "/mediaUrl").ok_or("Invalid Spotify format.")?;
            let track_title = str_at(track, "/title").unwrap_or_else(|| "(No title)".into());
            let number = match track.get("number") {
                Some(Value::Number(number)) => number.to_string(),
                Some(Value::String(number)) => number.clone(),
                _ => String::new(),
            };
            caption.push_str(&format!(
                "<b>Track:</b> #{number} {}",
                escape_html(&track_title)
            ));
            url
        }
        _ => return Err("Invalid Spotify format.".into()),
    };

    Ok(NormalizedResult::single(audio_url, MediaKind::Audio, caption)
        .with_thumbnail(thumbnail)
        .with_title(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{MediaEntry, ResultKind};
    use serde_json::json;

    #[test]
    fn soundcloud_is_audio_with_artist_caption() {
        let result = soundcloud(&json!({
            "result": {
                "downloadUrl": "https://sc.example/stream",
                "title": "Rain & Thunder",
                "author": "Nimbus",
                "genre": "Ambient"
            }
        }))
        .unwrap();

        assert_eq!(result.kind, ResultKind::Audio);
        assert_eq!(
            result.media,
            vec![MediaEntry::typed("https://sc.example/stream", MediaKind::Audio)]
        );
        let caption = result.caption.unwrap();
        assert!(caption.starts_with("SoundCloud Audio:\nNimbus - Rain & Thunder.mp3"));
        assert!(caption.contains("<i>Rain &amp; Thunder</i>"));
        assert!(caption.ends_with("Genre: <i>Ambient</i>"));
    }

    #[test]
    fn soundcloud_without_download_fails() {
        assert_eq!(
            soundcloud(&json!({"result": {"title": "x"}})).unwrap_err(),
            "Invalid SoundCloud data."
        );
    }

    #[test]
    fn spotify_accepts_direct_download() {
        let result = spotify(&json!({
            "data": {"title": "Song", "artist": "Band", "thumbnail": "https://i.scdn/cover.jpg"},
            "download": "https://dl.example/song.mp3"
        }))
        .unwrap();

        assert_eq!(result.kind, ResultKind::Audio);
        assert_eq!(
            result.media,
            vec![MediaEntry::typed("https://dl.example/song.mp3", MediaKind::Audio)]
        );
        assert_eq!(result.thumbnail.as_deref(), Some("https://i.scdn/cover.jpg"));
        assert!(result.caption.unwrap().ends_with("<b>Download:</b> Song"));
    }

    #[test]
    fn spotify_uses_first_track_of_list() {
        let result = spotify(&json!({
            "data": {"title": "Album"},
            "download": [
                {"mediaUrl": "https://dl.example/1.mp3", "title": "Intro", "number": 1},
                {"mediaUrl": "https://dl.example/2.mp3", "title": "Second", "number": 2}
            ]
        }))
        .unwrap();

        assert_eq!(
            result.media,
            vec![MediaEntry::typed("https://dl.example/1.mp3", MediaKind::Audio)]
        );
        assert!(result.caption.unwrap().ends_with("<b>Track:</b> #1 Intro"));
    }

    #[test]
    fn spotify_rejects_unknown_download_shapes() {
        assert!(spotify(&json!({"data": {"title": "x"}})).is_err());
        assert!(spotify(&json!({"data": {"title": "x"}, "download": [{"title": "no url"}]})).is_err());
        assert!(spotify(&json!({"download": "https://dl.example/a.mp3"})).is_err());
    }
}
