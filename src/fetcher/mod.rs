//! Fetcher module containing the public entry points, builder pattern, and
//! configuration.
//!
//! This module provides the main [`Fetcher`] struct and its associated
//! builder for configuring and executing retrievals. It handles single-file
//! fetches, bounded parallel batches with first-error-wins cancellation,
//! progress reporting, and resume budgets.
//!
//! # Overview
//!
//! The fetcher module is organized into four components:
//!
//! - `fetcher` - the Fetcher struct and single-file retrieval
//! - `batch` - bounded parallel batch retrieval and the result stream
//! - `builder` - FetcherBuilder for flexible configuration
//! - `config` - configuration structure and defaults
//!
//! # Examples
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use hoist::fetcher::FetcherBuilder;
//! use reqwest::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = FetcherBuilder::new().max_parallelism(4).build();
//! let urls = vec![
//!     Url::parse("https://example.com/file1.zip")?,
//!     Url::parse("https://example.com/file2.pdf")?,
//! ];
//!
//! let mut results = fetcher.fetch_all(&urls).await?;
//! while let Some(result) = results.next().await {
//!     let fetched = result?;
//!     println!("done: {}", fetched.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod builder;
pub mod config;
pub mod fetcher;

pub use batch::BatchStream;
pub use builder::FetcherBuilder;
pub use config::FetcherConfig;
pub use fetcher::{Fetched, Fetcher};
