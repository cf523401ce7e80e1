use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static PATH_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid regex"));
static NON_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s\-.()&@]").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static MARKDOWN_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([_*\[\]()~`>#+\-=|{}.!])").expect("valid regex"));

/// Drops path-unsafe characters, blanks out anything else unusual and
/// collapses whitespace.
pub fn sanitize_file_name(filename: &str) -> String {
    let without_unsafe = PATH_UNSAFE.replace_all(filename, "");
    let spaced = NON_FILENAME.replace_all(&without_unsafe, " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}

/// Compact view/like counts: `1500` becomes `1.5K`.
pub fn format_count(value: Option<&Value>) -> String {
    let count = numeric(value);
    if count >= 1e9 {
        format!("{:.1}B", count / 1e9)
    } else if count >= 1e6 {
        format!("{:.1}M", count / 1e6)
    } else if count >= 1e3 {
        format!("{:.1}K", count / 1e3)
    } else {
        format!("{count}")
    }
}

pub fn format_size(bytes: f64) -> String {
    if bytes >= 1e9 {
        format!("{:.2} GB", bytes / 1e9)
    } else if bytes >= 1e6 {
        format!("{:.2} MB", bytes / 1e6)
    } else if bytes >= 1e3 {
        format!("{:.2} KB", bytes / 1e3)
    } else {
        format!("{bytes} B")
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_markdown(text: &str) -> String {
    MARKDOWN_SPECIAL.replace_all(text, r"\$1").into_owned()
}

/// Numbers or numeric strings; anything else counts as zero.
fn numeric(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite()).unwrap_or(0.0)
}
