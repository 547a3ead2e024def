//! Builder pattern implementation for creating Fetcher instances.
//!
//! This module provides the [`FetcherBuilder`] struct that implements the
//! builder pattern for configuring and creating [`Fetcher`] instances:
//! resume budget, batch parallelism, progress rendering, HTTP headers, proxy,
//! and the response-cache backend.
//!
//! # Examples
//!
//! ## Basic Builder Usage
//!
//! ```rust
//! use hoist::fetcher::FetcherBuilder;
//! use std::path::PathBuf;
//!
//! let fetcher = FetcherBuilder::new()
//!     .directory(PathBuf::from("./downloads"))
//!     .max_parallelism(5)
//!     .resume_retries(3)
//!     .build();
//! ```
//!
//! ## Quiet Mode with a Cache Backend
//!
//! ```rust
//! use std::sync::Arc;
//! use hoist::cache::MemoryCache;
//! use hoist::fetcher::FetcherBuilder;
//!
//! let fetcher = FetcherBuilder::new()
//!     .quiet(true)
//!     .cache(Arc::new(MemoryCache::new()))
//!     .build();
//! ```

use super::{config::FetcherConfig, fetcher::Fetcher};
use crate::cache::ResponseCache;
use crate::progress::ProgressKind;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::{path::PathBuf, sync::Arc};

/// A builder used to create a [`Fetcher`].
///
/// ```rust
/// # fn main()  {
/// use hoist::fetcher::FetcherBuilder;
///
/// let f = FetcherBuilder::new().resume_retries(5).directory("downloads".into()).build();
/// # }
/// ```
#[derive(Default)]
pub struct FetcherBuilder {
    config: FetcherConfig,
}

impl FetcherBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        FetcherBuilder::default()
    }

    /// Convenience function to hide the progress bars.
    pub fn hidden() -> Self {
        let mut builder = FetcherBuilder::default();
        builder.config.quiet = true;
        builder
    }

    /// Sets the directory where to store the fetched files.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Set the bound on resume attempts per transfer.
    pub fn resume_retries(mut self, resume_retries: u32) -> Self {
        self.config.resume_retries = resume_retries;
        self
    }

    /// Set the maximum number of concurrent transfers in a batch.
    ///
    /// Values below 1 are rejected by `fetch_all` before any network
    /// activity.
    pub fn max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.config.max_parallelism = max_parallelism;
        self
    }

    /// Suppress all progress rendering.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.quiet = quiet;
        self
    }

    /// Enable or disable colored progress bars.
    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// Select the progress-rendering strategy.
    pub fn progress_style(mut self, kind: ProgressKind) -> Self {
        self.config.progress_kind = kind;
        self
    }

    /// Set the number of transport-level retries inside the middleware
    /// stack.
    pub fn request_retries(mut self, retries: u32) -> Self {
        self.config.request_retries = retries;
        self
    }

    /// Set the proxy used by the underlying HTTP session.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the response-cache backend the transport cooperates with.
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.config.cache = cache;
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// You need to pass in a `HeaderMap`, not a `HeaderName`.
    /// `HeaderMap` is a set of http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one.
    ///
    /// # Example
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue, HeaderMap};
    /// use hoist::fetcher::FetcherBuilder;
    ///
    /// let ua = HeaderValue::from_str("curl/7.87").expect("Invalid UA");
    ///
    /// let builder = FetcherBuilder::new()
    ///     .headers(HeaderMap::from_iter([(header::USER_AGENT, ua)]))
    ///     .build();
    /// ```
    ///
    /// See also [`header()`].
    ///
    /// [`header()`]: FetcherBuilder::header
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add the http header
    ///
    /// # Example
    ///
    /// You can use the `.header()` chain to add multiple headers
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue};
    /// use hoist::fetcher::FetcherBuilder;
    ///
    /// let ua = HeaderValue::from_str("curl/7.87").expect("Invalid UA");
    /// let auth = HeaderValue::from_str("Basic aGk6MTIzNDU2Cg==").expect("Invalid auth");
    ///
    /// let builder = FetcherBuilder::new()
    ///     .header(header::USER_AGENT, ua)
    ///     .header(header::AUTHORIZATION, auth)
    ///     .build();
    /// ```
    ///
    /// If you need to pass in a `HeaderMap`, instead of calling `.header()`
    /// multiple times. See also [`headers()`].
    ///
    /// [`headers()`]: FetcherBuilder::headers
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Create the [`Fetcher`] with the specified options.
    pub fn build(self) -> Fetcher {
        Fetcher::new(self.config)
    }
}
