//! Configuration structures and defaults for the fetcher.
//!
//! This module provides the configuration consumed by [`Fetcher`] and built
//! through [`FetcherBuilder`]. It covers the resume budget, batch
//! parallelism, progress rendering, the transport-level retry count, and the
//! pluggable response-cache backend.
//!
//! [`Fetcher`]: crate::fetcher::Fetcher
//! [`FetcherBuilder`]: crate::fetcher::FetcherBuilder

use crate::cache::{NoCache, ResponseCache};
use crate::progress::{ProgressKind, StyleOptions};

use reqwest::header::HeaderMap;
use std::env::current_dir;
use std::sync::Arc;

/// Configuration structure for the fetcher.
#[derive(Clone)]
pub struct FetcherConfig {
    /// Directory where to store the fetched files.
    pub directory: std::path::PathBuf,
    /// Bound on resume attempts per transfer.
    pub resume_retries: u32,
    /// Maximum number of concurrent transfers in a batch. Must be >= 1.
    pub max_parallelism: usize,
    /// Suppress all progress rendering.
    pub quiet: bool,
    /// Render progress bars with color.
    pub color: bool,
    /// Progress-rendering strategy.
    pub progress_kind: ProgressKind,
    /// Custom HTTP headers applied to plain GET requests.
    pub headers: Option<HeaderMap>,
    /// Transport-level retries inside the middleware stack.
    pub request_retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Response-cache backend the transport cooperates with.
    pub cache: Arc<dyn ResponseCache>,
}

impl FetcherConfig {
    /// Resolve the progress style for this configuration.
    pub fn style_options(&self) -> StyleOptions {
        if self.quiet {
            StyleOptions::for_kind(ProgressKind::Hidden, false)
        } else {
            StyleOptions::for_kind(self.progress_kind, self.color)
        }
    }
}

impl std::fmt::Debug for FetcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherConfig")
            .field("directory", &self.directory)
            .field("resume_retries", &self.resume_retries)
            .field("max_parallelism", &self.max_parallelism)
            .field("quiet", &self.quiet)
            .field("color", &self.color)
            .field("progress_kind", &self.progress_kind)
            .field("headers", &self.headers)
            .field("request_retries", &self.request_retries)
            .finish_non_exhaustive()
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            resume_retries: 5,
            max_parallelism: 32,
            quiet: false,
            color: true,
            progress_kind: ProgressKind::default(),
            headers: None,
            request_retries: 3,
            proxy: None,
            cache: Arc::new(NoCache),
        }
    }
}
