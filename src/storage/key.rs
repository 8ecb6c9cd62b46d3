//! Object key helpers.

/// Folder used when an upload request names none.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build `"{folder}/{millis}-{safe_filename}"`.
pub fn upload_key(folder: Option<&str>, filename: &str, millis: u64) -> String {
    let folder = folder
        .map(|f| f.trim_matches('/'))
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_UPLOAD_FOLDER);
    format!("{}/{}-{}", folder, millis, sanitize_filename(filename))
}

/// Extract the object key from a public URL served under `public_base`.
///
/// The scheme of `public_base` is ignored, so `http://` and `https://` URLs
/// of the same host both match. Returns `None` for URLs outside the base or
/// pointing at the base itself.
pub fn key_from_public_url(public_base: &str, url: &str) -> Option<String> {
    let base = strip_scheme(public_base).trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    let rest = strip_scheme(url).strip_prefix(base)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let key = rest.trim_start_matches('/');
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}
