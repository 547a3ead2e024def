//! HTTP module containing the client factory and the cache-aware transport.
//!
//! This module owns everything that talks to the network:
//!
//! - [`client`] - middleware client creation (retry, tracing, proxy, headers)
//! - [`transport`] - HEAD/GET/range-GET issuing and manual cache repair
//! - [`response`] - the uniform live-or-cached response type
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hoist::cache::NoCache;
//! use hoist::http::{create_http_client, HttpClientConfig, HttpTransport};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_http_client(HttpClientConfig::default())?;
//! let transport = HttpTransport::new(client, Arc::new(NoCache));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod response;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig};
pub use response::FetchResponse;
pub use transport::{HttpTransport, RemoteInfo};
