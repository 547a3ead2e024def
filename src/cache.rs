//! Response-cache adapter seam.
//!
//! The HTTP cache layer this engine cooperates with never stores partial
//! (206) responses. Without help, every resumed download would therefore be a
//! permanent cache miss on retry. The [`ResponseCache`] trait models the
//! narrow interface the engine needs from such a cache: a lookup before
//! hitting the network and an explicit commit that the transport calls once a
//! resumed transfer has completed, storing an entry synthesized to look like
//! a single ordinary 200 response.
//!
//! Two backends ship with the crate: [`NoCache`] (every lookup misses and the
//! commit is a no-op) and [`MemoryCache`], a process-local map useful for
//! tests and short-lived tools.

use crate::error::Result;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// A complete response held by a cache backend.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Status of the synthesized response (always a success status).
    pub status: StatusCode,
    /// Response headers, minus any range framing.
    pub headers: HeaderMap,
    /// The full body.
    pub body: Bytes,
}

/// Narrow cache interface the transport drives.
///
/// Implementations must be safe for concurrent use; a single adapter instance
/// is shared by every worker in a batch.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Looks up a complete response for `url`. A miss returns `None`.
    async fn lookup(&self, url: &str) -> Result<Option<CachedResponse>>;

    /// Commits a complete response under `url`, streaming the body from
    /// `body_path`.
    ///
    /// Callable only once the corresponding transfer reports complete; the
    /// headers have already been scrubbed of range framing by the caller.
    async fn store(
        &self,
        url: &str,
        status: StatusCode,
        headers: HeaderMap,
        body_path: &Path,
    ) -> Result<()>;
}

/// Cache backend that caches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn lookup(&self, _url: &str) -> Result<Option<CachedResponse>> {
        Ok(None)
    }

    async fn store(
        &self,
        _url: &str,
        _status: StatusCode,
        _headers: HeaderMap,
        _body_path: &Path,
    ) -> Result<()> {
        Ok(())
    }
}

/// In-memory cache backend keyed by URL.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn lookup(&self, url: &str) -> Result<Option<CachedResponse>> {
        Ok(self.entries.lock().unwrap().get(url).cloned())
    }

    async fn store(
        &self,
        url: &str,
        status: StatusCode,
        headers: HeaderMap,
        body_path: &Path,
    ) -> Result<()> {
        let body = Bytes::from(tokio::fs::read(body_path).await?);
        self.entries.lock().unwrap().insert(
            url.to_string(),
            CachedResponse {
                status,
                headers,
                body,
            },
        );
        Ok(())
    }
}
