//! Progress module containing progress bar functionality.
//!
//! This module provides progress bar styling, display management, and
//! aggregate progress tracking for retrieval sessions. It handles both
//! individual transfer progress and the batch-wide aggregate bytes bar.
//!
//! # Overview
//!
//! The progress module is organized into two main components:
//!
//! - `style` - Progress bar styling options, templates, and presets
//! - `display` - Progress bar display management and coordination
//!
//! # Examples
//!
//! ```rust
//! use hoist::progress::{ProgressKind, StyleOptions};
//!
//! // Pick a preset through the configuration surface
//! let style = StyleOptions::for_kind(ProgressKind::Pip, true);
//! assert!(style.is_enabled());
//! ```

pub(crate) mod display;
pub(crate) mod style;

pub use display::ProgressDisplay;
pub use style::{ProgressBarOpts, ProgressKind, StyleOptions};
