//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one indicatif status line per destination collection.
//! Non-TTY mode: hidden bars; the flush log lines are the only telemetry.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Characters of the collection name shown before the status
const PREFIX_WIDTH: usize = 20;

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Context that never draws (tests, piped output)
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: false,
        }
    }

    /// Spinner line for one destination collection.
    ///
    /// The sink writer updates its message with the cumulative document
    /// count at every flush. Hidden when not a TTY.
    pub fn collection_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix:<20.cyan.bold} {elapsed:>4} {wide_msg}")
                .expect("invalid template"),
        );
        // Truncate long names to keep lines aligned
        pb.set_prefix(name.chars().take(PREFIX_WIDTH).collect::<String>());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Print a line above managed progress bars (avoids interference).
    ///
    /// Use this instead of `eprintln!` when progress bars are active.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Whether running in TTY mode.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_num_small() {
        assert_eq!(fmt_num(0), "0");
        assert_eq!(fmt_num(100), "100");
    }

    #[test]
    fn fmt_num_checkpoints() {
        assert_eq!(fmt_num(50_000), "50,000");
        assert_eq!(fmt_num(150_000), "150,000");
        assert_eq!(fmt_num(1_234_567), "1,234,567");
    }

    #[test]
    fn long_names_are_truncated_by_character() {
        let progress = ProgressContext {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            is_tty: true,
        };
        let line = progress.collection_line("aaaaaaaaaaaaaaaaaaaéé");
        assert_eq!(line.prefix(), "aaaaaaaaaaaaaaaaaaaé");
        line.finish_and_clear();

        let line = progress.collection_line("événements");
        assert_eq!(line.prefix(), "événements");
        line.finish_and_clear();
    }

    #[test]
    fn hidden_context_hides_lines() {
        let progress = ProgressContext::hidden();
        assert!(!progress.is_tty());
        assert!(progress.collection_line("events").is_hidden());
    }
}
