use serde_json::Value;

use super::text::{format_size, sanitize_file_name};
use super::{MediaKind, NormalizedResult, str_at};

pub fn mediafire(payload: &Value) -> Result<NormalizedResult, String> {
    let download = str_at(payload, "/data/download").ok_or("File not found.")?;
    let filename = str_at(payload, "/data/filename")
        .map(|name| sanitize_file_name(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "File".into());

    let size = match payload.pointer("/data/size") {
        Some(Value::Number(bytes)) => bytes.as_f64().map(format_size),
        Some(Value::String(size)) if !size.trim().is_empty() => Some(size.trim().to_string()),
        _ => None,
    };
    let size_suffix = size.map(|size| format!(" ({size})")).unwrap_or_default();
    let caption = format!(
        "*MediaFire File:*\n*{filename}*{size_suffix}\n\n[Click to download]({download})"
    );

    let mut result = NormalizedResult::single(download, MediaKind::Document, caption)
        .with_title(Some(filename.clone()));
    result.filename = Some(filename);
    Ok(result)
}
