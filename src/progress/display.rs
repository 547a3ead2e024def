//! Progress display management and coordination.
//!
//! [`ProgressDisplay`] coordinates the bars of one retrieval session: a main
//! bar tracking aggregate bytes across every transfer, plus a child bar per
//! in-flight file. It is one of the two objects in a batch that are mutated
//! from multiple workers (the other being the completion channel), and is
//! internally synchronized.
//!
//! When any probed size is unknown the aggregate total is meaningless, so
//! the main bar is suppressed and only per-file progress is rendered.

use crate::progress::StyleOptions;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::sync::Arc;

/// Progress display manager that coordinates multiple progress bars.
#[derive(Clone)]
pub struct ProgressDisplay {
    /// The multi-progress instance for coordinating multiple progress bars.
    multi: Arc<MultiProgress>,
    /// The main aggregate-bytes progress bar.
    main: Arc<ProgressBar>,
    /// Style options for progress bars.
    style_options: StyleOptions,
    /// Whether the aggregate bar is shown at all.
    show_main_progress: bool,
}

impl ProgressDisplay {
    /// Create a new progress display manager.
    ///
    /// # Arguments
    /// * `style_options` - Style configuration for progress bars
    /// * `total_bytes` - Aggregate size of the whole batch; `None` when any
    ///   transfer's size is unknown, which suppresses the main bar
    pub fn new(style_options: StyleOptions, total_bytes: Option<u64>) -> Self {
        let multi = match style_options.is_enabled() {
            true => Arc::new(MultiProgress::new()),
            false => Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden())),
        };

        let show_main_progress = total_bytes.is_some() && style_options.main().enabled;

        let main = if let (true, Some(total)) = (show_main_progress, total_bytes) {
            let bar = multi.add(style_options.main().clone().to_progress_bar(total));
            bar.tick();
            Arc::new(bar)
        } else {
            // Not added to the MultiProgress, so it never draws.
            Arc::new(ProgressBar::hidden())
        };

        Self {
            multi,
            main,
            style_options,
            show_main_progress,
        }
    }

    /// Create a display for a lone transfer.
    ///
    /// A single transfer renders only its own bar; an aggregate bar would
    /// duplicate it byte for byte, so it is suppressed.
    pub fn for_single_transfer(style_options: StyleOptions) -> Self {
        Self::new(style_options, None)
    }

    /// Create a child progress bar for an individual transfer.
    ///
    /// # Arguments
    /// * `size` - Expected size, if known
    /// * `position` - Starting position (non-zero after a restart-free resume)
    pub fn create_child_progress(&self, size: Option<u64>, position: u64) -> ProgressBar {
        self.multi.add(
            self.style_options
                .child()
                .clone()
                .to_progress_bar(size.unwrap_or(0))
                .with_position(position),
        )
    }

    /// Advance the aggregate bar by a number of bytes.
    pub fn add_bytes(&self, bytes: u64) {
        self.main.inc(bytes);
    }

    /// Wind the aggregate bar back, used when a transfer restarts from zero.
    pub fn retract_bytes(&self, bytes: u64) {
        let position = self.main.position().saturating_sub(bytes);
        self.main.set_position(position);
    }

    /// Finish a child progress bar based on configuration.
    pub fn finish_child(&self, pb: ProgressBar) {
        if self.style_options.child().clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
    }

    /// Finish the whole display, clearing or keeping the main bar based on
    /// configuration.
    pub fn finish(&self) {
        if self.show_main_progress {
            if self.style_options.main().clear {
                self.main.finish_and_clear();
            } else {
                self.main.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressBarOpts, ProgressKind};

    #[test]
    fn unknown_total_hides_main_bar() {
        let display = ProgressDisplay::new(StyleOptions::default(), None);
        assert!(!display.show_main_progress);
    }

    #[test]
    fn single_transfer_display_suppresses_main_bar() {
        let display = ProgressDisplay::for_single_transfer(StyleOptions::default());
        assert!(!display.show_main_progress);
    }

    #[test]
    fn known_total_shows_main_bar() {
        let display = ProgressDisplay::new(StyleOptions::default(), Some(4096));
        assert!(display.show_main_progress);
    }

    #[test]
    fn hidden_style_never_shows_main_bar() {
        let style = StyleOptions::for_kind(ProgressKind::Hidden, false);
        let display = ProgressDisplay::new(style, Some(4096));
        assert!(!display.show_main_progress);
    }

    #[test]
    fn child_bar_starts_at_position() {
        let style = StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::default());
        let display = ProgressDisplay::new(style, Some(100));
        let child = display.create_child_progress(Some(100), 40);
        assert_eq!(child.position(), 40);
        display.finish_child(child);
    }
}
