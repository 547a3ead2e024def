//! Cache-aware transport.
//!
//! [`HttpTransport`] is the stateless service object that issues every
//! request the engine makes: HEAD probes, plain GETs, ranged resume GETs,
//! and the manual cache repair that follows a resumed transfer. It wraps the
//! shared middleware session plus a [`ResponseCache`] adapter and holds no
//! per-transfer state, so any number of workers can drive the same instance
//! concurrently.
//!
//! The cache repair step exists because the cache layer never stores 206
//! responses. Once a multi-request transfer completes, the transport
//! synthesizes an entry that looks like a single ordinary 200 — the original
//! headers minus the range framing, with the true final length — and streams
//! the now-complete file into the cache body store. Without this, every
//! resumed download would be a permanent cache miss on retry.

use crate::cache::ResponseCache;
use crate::error::{Error, Result};
use crate::http::response::FetchResponse;
use crate::transfer::TransferRecord;
use crate::utils::filename::filename_from_content_disposition;

use reqwest::header::{
    HeaderMap, HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    ETAG, IF_RANGE, LAST_MODIFIED, RANGE,
};
use reqwest::{StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use tracing::debug;

/// What a HEAD probe learned about a remote resource.
#[derive(Debug, Clone)]
pub struct RemoteInfo {
    /// Declared size, if the server sent a Content-Length.
    pub size: Option<u64>,
    /// Filename suggested by a Content-Disposition header.
    pub filename: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
}

/// Stateless request issuer shared by all workers.
#[derive(Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
    cache: Arc<dyn ResponseCache>,
}

impl HttpTransport {
    /// Creates a transport over a shared session and cache adapter.
    pub fn new(client: ClientWithMiddleware, cache: Arc<dyn ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// The cache adapter this transport commits to.
    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Probes a resource with a HEAD request.
    ///
    /// A non-success status is a connectivity error and propagates
    /// immediately.
    pub async fn head_content_info(&self, url: &Url) -> Result<RemoteInfo> {
        debug!("HEAD {}", url);
        let res = self.client.head(url.clone()).send().await?;
        if !res.status().is_success() {
            return Err(Error::Connectivity {
                url: url.to_string(),
                status: res.status(),
            });
        }

        let headers = res.headers();
        let size = header_u64(headers, &CONTENT_LENGTH);
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(RemoteInfo {
            size,
            filename,
            content_type,
        })
    }

    /// Issues a plain GET, consulting the cache first.
    ///
    /// A cache hit is served without any network I/O. A non-success status
    /// is a connectivity error.
    pub async fn get(&self, url: &Url, headers: Option<&HeaderMap>) -> Result<FetchResponse> {
        if let Some(hit) = self.cache.lookup(url.as_str()).await? {
            debug!("cache hit for {}", url);
            return Ok(FetchResponse::from_cache(hit));
        }

        debug!("GET {}", url);
        let mut req = self.client.get(url.clone());
        if let Some(h) = headers {
            req = req.headers(h.clone());
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            return Err(Error::Connectivity {
                url: url.to_string(),
                status: res.status(),
            });
        }
        Ok(FetchResponse::from_network(res))
    }

    /// Issues a ranged GET to continue an interrupted transfer.
    ///
    /// The request carries `Range: bytes=<received>-` and, when the baseline
    /// response had an ETag or Last-Modified, an `If-Range` validator so the
    /// server can reject the range atomically if the resource changed.
    ///
    /// Both 206 and 200 are returned to the caller: a 200 means the server
    /// ignored the range and is restarting from byte zero, which the resume
    /// orchestrator must answer with a file reset. Any other status is a
    /// connectivity error.
    pub async fn get_resume(
        &self,
        transfer: &TransferRecord,
        baseline: &HeaderMap,
    ) -> Result<FetchResponse> {
        let offset = transfer.received();
        debug!("GET {} resuming at byte {}", transfer.url, offset);

        let mut req = self
            .client
            .get(transfer.url.clone())
            .header(RANGE, format!("bytes={}-", offset));
        if let Some(validator) = baseline.get(ETAG).or_else(|| baseline.get(LAST_MODIFIED)) {
            req = req.header(IF_RANGE, validator.clone());
        }

        let res = req.send().await?;
        match res.status() {
            StatusCode::PARTIAL_CONTENT | StatusCode::OK => Ok(FetchResponse::from_network(res)),
            status => Err(Error::Connectivity {
                url: transfer.url.to_string(),
                status,
            }),
        }
    }

    /// Repairs the cache after a resumed transfer completed.
    ///
    /// Synthesizes an entry as though the whole file had been fetched by one
    /// ordinary 200 response: all baseline headers except the range framing,
    /// a Content-Length equal to the true final size, and the completed file
    /// as the body.
    pub async fn cache_resumed_download(
        &self,
        transfer: &TransferRecord,
        baseline: &HeaderMap,
    ) -> Result<()> {
        let mut headers = baseline.clone();
        headers.remove(CONTENT_RANGE);
        headers.remove(CONTENT_LENGTH);
        if let Ok(len) = HeaderValue::from_str(&transfer.received().to_string()) {
            headers.insert(CONTENT_LENGTH, len);
        }

        debug!(
            "committing resumed download of {} ({} bytes) to cache",
            transfer.url,
            transfer.received()
        );
        self.cache
            .store(transfer.url.as_str(), StatusCode::OK, headers, transfer.path())
            .await
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

fn header_u64(headers: &HeaderMap, name: &reqwest::header::HeaderName) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}
