//! Error handling for the hoist library.
//!
//! This module provides centralized error handling with comprehensive error types
//! that can occur during retrieval operations. All errors implement the standard
//! Error trait and provide detailed context about failures.

use std::io;
use thiserror::Error;

/// Errors that can happen when using hoist.
///
/// The variants mirror the failure taxonomy of the engine: connectivity
/// failures are fatal and surfaced immediately, transient transfer errors are
/// absorbed by the resume machinery and only show up as
/// [`Error::IncompleteTransfer`] once the resume budget is exhausted.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration supplied to a public entry point.
    ///
    /// Raised synchronously, before any network activity takes place.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The server answered a HEAD or GET with a non-success status, or the
    /// request could not be sent at all.
    ///
    /// Connectivity errors are never retried by this layer.
    #[error("Connectivity error fetching {url}: HTTP {status}")]
    Connectivity {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A transfer could not be completed within the resume budget.
    ///
    /// The partial output file has already been removed when this is raised.
    #[error("Incomplete transfer of {url}: received {received} of {expected} bytes")]
    IncompleteTransfer {
        url: String,
        received: u64,
        expected: u64,
    },

    /// A batch worker observed the shared error flag and stopped before or
    /// during its transfer.
    #[error("Transfer aborted by an earlier failure in the batch")]
    Aborted,

    /// I/O Error.
    ///
    /// File-system failures (disk full, permission denied) are fatal and are
    /// never consumed by the resume loop.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from the reqwest middleware stack.
    #[error("Request Error")]
    Request {
        #[from]
        source: reqwest_middleware::Error,
    },
}

/// Result type alias for operations that can fail with a hoist error.
pub type Result<T> = std::result::Result<T, Error>;
