//! Content length extraction utilities.
//!
//! Helpers for reading size information out of HTTP headers, supporting both
//! Content-Range and Content-Length.

/// Parse a Content-Range header to extract the total size.
///
/// Content-Range header format: "bytes start-end/total".
///
/// # Example
///
/// ```rust
/// use hoist::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    content_range
        .split('/')
        .next_back()
        .and_then(|size| size.trim().parse::<u64>().ok())
}
