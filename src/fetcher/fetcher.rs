//! Core fetcher implementation for single-file retrieval.
//!
//! This module contains the main [`Fetcher`] struct, the public entry point
//! of the engine. A fetcher is configured once via
//! [`FetcherBuilder`](super::FetcherBuilder) and can then retrieve single
//! files ([`Fetcher::fetch`]) or bounded parallel batches
//! ([`Fetcher::fetch_all`](super::batch), implemented in the batch module).
//!
//! # Examples
//!
//! ```rust,no_run
//! use hoist::fetcher::FetcherBuilder;
//! use reqwest::Url;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = FetcherBuilder::new()
//!     .directory(PathBuf::from("./downloads"))
//!     .resume_retries(5)
//!     .build();
//!
//! let url = Url::parse("https://example.com/artifact.tar.gz")?;
//! let fetched = fetcher.fetch(&url).await?;
//! println!("saved to {}", fetched.path.display());
//! # Ok(())
//! # }
//! ```

use super::config::FetcherConfig;
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig, HttpTransport};
use crate::progress::ProgressDisplay;
use crate::resume::{ChunkObserver, ResumeOrchestrator};
use crate::transfer::TransferRecord;
use crate::utils::filename::derive_filename;

use indicatif::ProgressBar;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Url;
use std::fmt;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Outcome of one successful fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The locator the bytes came from.
    pub url: Url,
    /// Path of the file written under the configured directory.
    pub path: PathBuf,
    /// Content type declared by the response, if any.
    pub content_type: Option<String>,
}

/// Represents the retrieval controller.
///
/// A fetcher can be created via its builder:
///
/// ```rust
/// # fn main()  {
/// use hoist::fetcher::FetcherBuilder;
///
/// let f = FetcherBuilder::new().build();
/// # }
/// ```
#[derive(Clone)]
pub struct Fetcher {
    pub(super) config: FetcherConfig,
}

impl Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish()
    }
}

impl Fetcher {
    /// Creates a new Fetcher with the given configuration.
    pub(crate) fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Gets the directory where files will be stored.
    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }

    /// Gets the resume budget per transfer.
    pub fn resume_retries(&self) -> u32 {
        self.config.resume_retries
    }

    /// Gets the maximum batch parallelism.
    pub fn max_parallelism(&self) -> usize {
        self.config.max_parallelism
    }

    /// Gets whether progress rendering is suppressed.
    pub fn quiet(&self) -> bool {
        self.config.quiet
    }

    /// Gets the custom headers.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.config.headers.as_ref()
    }

    /// Builds the cache-aware transport over a fresh middleware session.
    pub(super) fn build_transport(&self) -> Result<HttpTransport> {
        let client = create_http_client(HttpClientConfig {
            retries: self.config.request_retries,
            proxy: self.config.proxy.clone(),
            headers: self.config.headers.clone(),
        })?;
        Ok(HttpTransport::new(client, Arc::clone(&self.config.cache)))
    }

    /// Fetches one URL into the configured directory.
    ///
    /// The output filename is derived from the response headers
    /// (Content-Disposition, else the URL basename, with an extension
    /// inferred from Content-Type when absent). On any fatal error the
    /// partial file has been removed before this returns.
    pub async fn fetch(&self, url: &Url) -> Result<Fetched> {
        let transport = self.build_transport()?;
        self.fetch_with(&transport, url).await
    }

    /// Fetch driven by an already-built transport; shared with the batch
    /// workers.
    pub(super) async fn fetch_with(
        &self,
        transport: &HttpTransport,
        url: &Url,
    ) -> Result<Fetched> {
        debug!("fetching {}", url);
        fs::create_dir_all(&self.config.directory).await?;

        let response = transport.get(url, self.config.headers.as_ref()).await?;
        let total = response.total_size();

        let display = ProgressDisplay::for_single_transfer(self.config.style_options());
        let child = display.create_child_progress(total, 0);
        let observer = ProgressObserver::new(child.clone(), display.clone(), None);

        let result = self
            .run_transfer(transport, url, response, None, &observer)
            .await;
        display.finish_child(child);
        display.finish();
        result
    }

    /// Names the destination, builds the transfer record, and hands the
    /// response to the resume orchestrator.
    ///
    /// `suggested` is a filename learned before the GET (batch workers pass
    /// the HEAD probe's Content-Disposition result); the response's own
    /// headers still take precedence.
    pub(super) async fn run_transfer(
        &self,
        transport: &HttpTransport,
        url: &Url,
        response: crate::http::FetchResponse,
        suggested: Option<&str>,
        observer: &dyn ChunkObserver,
    ) -> Result<Fetched> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let filename = derive_filename(
            url,
            disposition.as_deref(),
            suggested,
            content_type.as_deref(),
        );
        let path = self.config.directory.join(filename);

        let record = TransferRecord::create(url.clone(), &path, response.total_size()).await?;
        let orchestrator = ResumeOrchestrator::new(transport, self.config.resume_retries);
        let record = orchestrator.run(record, response, observer).await?;

        Ok(Fetched {
            url: url.clone(),
            path: record.path().to_path_buf(),
            content_type,
        })
    }
}

/// Chunk-processing strategy feeding the progress display and honoring the
/// batch abort flag.
pub(super) struct ProgressObserver {
    child: ProgressBar,
    display: ProgressDisplay,
    abort: Option<Arc<AtomicBool>>,
}

impl ProgressObserver {
    pub(super) fn new(
        child: ProgressBar,
        display: ProgressDisplay,
        abort: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            child,
            display,
            abort,
        }
    }
}

impl ChunkObserver for ProgressObserver {
    fn on_chunk(&self, len: u64) -> Result<()> {
        if let Some(abort) = &self.abort {
            if abort.load(Ordering::Relaxed) {
                return Err(Error::Aborted);
            }
        }
        self.child.inc(len);
        self.display.add_bytes(len);
        Ok(())
    }

    fn on_reset(&self, discarded: u64) {
        self.child.set_position(0);
        self.display.retract_bytes(discarded);
    }
}
