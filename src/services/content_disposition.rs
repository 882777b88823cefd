//! Filename extraction from `Content-Disposition`

use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_FILENAME: &str = "generated-code.zip";

/// Matches `filename=` / `filename*=`, quoted or bare
static FILENAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename(\*?)=(?:"([^"]+)"|([^;\s]+))"#).unwrap()
});

/// Filename suggested by the header, or `DEFAULT_FILENAME`
pub fn filename_from_disposition(header: Option<&str>) -> String {
    header
        .and_then(extract_filename)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn extract_filename(header: &str) -> Option<String> {
    let caps = FILENAME_REGEX.captures(header)?;
    let extended = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let mut raw = caps.get(2).or_else(|| caps.get(3))?.as_str();

    // RFC 5987: filename*=UTF-8''encoded%20name.zip
    if extended {
        if let Some((_, encoded)) = raw.split_once("''") {
            raw = encoded;
        }
    }

    let decoded = urlencoding::decode(raw).ok()?;
    sanitize(&decoded)
}

/// Keep only the final path component so a hostile header cannot escape
/// the download directory
fn sanitize(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
