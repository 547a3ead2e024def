//! Shared utility functions.
//!
//! This module contains utility functions that are used across multiple
//! modules in the hoist crate:
//!
//! - [`content_length`] - size extraction from HTTP headers
//! - [`filename`] - output filename derivation from headers and URLs
//!
//! # Examples
//!
//! ```rust
//! use hoist::utils::parse_content_range_total;
//!
//! let header_value = "bytes 0-1023/2048";
//! if let Some(total_size) = parse_content_range_total(header_value) {
//!     println!("Total file size: {} bytes", total_size);
//! }
//! ```

pub mod content_length;
pub mod filename;

pub use content_length::parse_content_range_total;
pub use filename::{derive_filename, extension_for_mime, filename_from_url};
