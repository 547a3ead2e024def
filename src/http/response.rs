//! Uniform response type over live and cached bodies.
//!
//! The transport can satisfy a GET either from the network or from the
//! response cache. [`FetchResponse`] papers over the difference: callers see
//! a status line, a header snapshot, and a `chunk()` pump, regardless of
//! where the bytes come from.

use crate::cache::CachedResponse;
use crate::error::Result;
use crate::utils::content_length::parse_content_range_total;

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_RANGE};
use reqwest::StatusCode;

enum Body {
    Live(reqwest::Response),
    Cached(Option<Bytes>),
}

/// A response being consumed by the engine.
///
/// Headers are snapshotted at construction so they remain available after
/// the body has been drained, which the resumed-download cache commit relies
/// on.
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl FetchResponse {
    /// Wraps a live network response.
    pub fn from_network(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        Self {
            status,
            headers,
            body: Body::Live(response),
        }
    }

    /// Wraps a cache hit.
    pub fn from_cache(cached: CachedResponse) -> Self {
        Self {
            status: cached.status,
            headers: cached.headers,
            body: Body::Cached(Some(cached.body)),
        }
    }

    /// Whether this response was served from the cache.
    pub fn is_from_cache(&self) -> bool {
        matches!(self.body, Body::Cached(_))
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Snapshot of the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Total size of the resource this response describes, if declared.
    ///
    /// For a 206 the Content-Range total takes precedence over the
    /// Content-Length of the partial body.
    pub fn total_size(&self) -> Option<u64> {
        if let Some(range) = self.headers.get(CONTENT_RANGE) {
            if let Some(total) = range.to_str().ok().and_then(parse_content_range_total) {
                return Some(total);
            }
        }
        self.headers
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    }

    /// Pulls the next body chunk.
    ///
    /// Returns `Ok(None)` at the natural end of the stream. A mid-body read
    /// error on a live response surfaces as `Err`; the resume orchestrator
    /// decides whether that is transient.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        match &mut self.body {
            Body::Live(response) => Ok(response.chunk().await?),
            Body::Cached(bytes) => Ok(bytes.take()),
        }
    }
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("from_cache", &self.is_from_cache())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn cached(headers: HeaderMap, body: &'static [u8]) -> FetchResponse {
        FetchResponse::from_cache(CachedResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(body),
        })
    }

    #[tokio::test]
    async fn cached_body_is_yielded_once() {
        let mut res = cached(HeaderMap::new(), b"abc");
        assert!(res.is_from_cache());
        assert_eq!(res.chunk().await.unwrap().unwrap().as_ref(), b"abc");
        assert!(res.chunk().await.unwrap().is_none());
    }

    #[test]
    fn total_size_prefers_content_range() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 5-9/2048"));
        headers.insert(
            reqwest::header::CONTENT_LENGTH,
            HeaderValue::from_static("5"),
        );
        let res = cached(headers, b"");
        assert_eq!(res.total_size(), Some(2048));
    }

    #[test]
    fn total_size_falls_back_to_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_LENGTH,
            HeaderValue::from_static("512"),
        );
        let res = cached(headers, b"");
        assert_eq!(res.total_size(), Some(512));
    }
}
