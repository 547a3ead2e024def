//! Hoist is a crate for fetching large binary artifacts over HTTP(S), singly
//! or in bounded parallel batches, tolerating connection drops mid-transfer
//! and cooperating with a response cache that cannot natively represent
//! partial transfers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use hoist::fetcher::FetcherBuilder;
//! use reqwest::Url;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = FetcherBuilder::new()
//!     .directory(PathBuf::from("output"))
//!     .resume_retries(5)
//!     .build();
//! let url = Url::parse("https://example.com/artifact.tar.gz")?;
//! let fetched = fetcher.fetch(&url).await?;
//! println!("{} -> {}", fetched.url, fetched.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`fetcher`] - Public entry points: single-file and batch retrieval
//! - [`transfer`] - Per-transfer progress bookkeeping
//! - [`resume`] - The resume orchestrator and its chunk-observer seam
//! - [`http`] - Client factory and the cache-aware transport
//! - [`cache`] - The response-cache adapter trait and bundled backends
//! - [`progress`] - Progress bar styling and display management
//! - [`error`] - Centralized error handling
//! - [`utils`] - Header parsing and filename derivation helpers

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod progress;
pub mod resume;
pub mod transfer;
pub mod utils;

pub use cache::{CachedResponse, MemoryCache, NoCache, ResponseCache};
pub use error::{Error, Result};
pub use fetcher::{BatchStream, Fetched, Fetcher, FetcherBuilder};
pub use http::{create_http_client, FetchResponse, HttpClientConfig, HttpTransport, RemoteInfo};
pub use progress::{ProgressBarOpts, ProgressKind, StyleOptions};
pub use resume::{ChunkObserver, NullObserver, ResumeOrchestrator};
pub use transfer::TransferRecord;
pub use utils::parse_content_range_total;
