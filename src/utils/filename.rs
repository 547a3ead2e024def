//! Output filename derivation.
//!
//! A fetched file is named from, in order of preference: the response's
//! Content-Disposition header, a name suggested earlier (e.g. by a HEAD
//! probe), the (percent-decoded) last URL path segment, and finally a fixed
//! fallback. When the chosen name has no extension and the response declared
//! a recognizable Content-Type, a matching extension is appended.

use reqwest::Url;

/// Name used when neither the headers nor the URL yield anything usable.
pub const FALLBACK_FILENAME: &str = "download";

/// Extracts the `filename` parameter from a Content-Disposition value.
///
/// Handles the common shapes `attachment; filename="name.ext"` and
/// `attachment; filename=name.ext`. Returns `None` for empty or
/// path-traversing names.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let name = value.split(';').find_map(|part| {
        let part = part.trim();
        part.strip_prefix("filename=")
            .map(|v| v.trim_matches('"').trim())
    })?;

    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return None;
    }
    Some(name.to_string())
}

/// Derives a filename from the last path segment of a URL.
///
/// The segment is percent-decoded; an empty result (e.g. a URL ending in
/// `/`) yields `None`.
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    let decoded: String = form_urlencoded::parse(segment.as_bytes())
        .map(|(key, val)| [key, val].concat())
        .collect();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Maps a MIME type to a conventional file extension.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    // The essential media type only; parameters like charset are ignored.
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    match essence {
        "application/zip" => Some("zip"),
        "application/gzip" | "application/x-gzip" => Some("gz"),
        "application/x-tar" => Some("tar"),
        "application/x-xz" => Some("xz"),
        "application/zstd" => Some("zst"),
        "application/pdf" => Some("pdf"),
        "application/json" => Some("json"),
        "application/octet-stream" => Some("bin"),
        "text/plain" => Some("txt"),
        "text/html" => Some("html"),
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        _ => None,
    }
}

/// Chooses the output filename for a response.
///
/// `suggested` is a name obtained out of band, already validated; it ranks
/// below the response's own Content-Disposition but above the URL basename.
pub fn derive_filename(
    url: &Url,
    content_disposition: Option<&str>,
    suggested: Option<&str>,
    content_type: Option<&str>,
) -> String {
    let mut name = content_disposition
        .and_then(filename_from_content_disposition)
        .or_else(|| suggested.map(str::to_string))
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

    let has_extension = name.rsplit('.').next().is_some_and(|ext| {
        !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
    }) && name.contains('.');

    if !has_extension {
        if let Some(ext) = content_type.and_then(extension_for_mime) {
            name.push('.');
            name.push_str(ext);
        }
    }
    name
}
