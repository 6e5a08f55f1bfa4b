//! Progress bars and CLI output utilities
//!
//! The backup engine reports progress through a callback; this module turns
//! those callbacks into an indicatif bar and provides the small print
//! helpers the command handlers share.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Style for file-transfer progress bars
fn transfer_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/dim}] {pos}/{len} ({percent}%) {msg}")
        .expect("Invalid progress template")
        .progress_chars("━━╾─")
}

/// Style for indeterminate spinners
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .expect("Invalid spinner template")
        .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷")
}

/// Progress bar for the backup run
///
/// The total file count is only known once the engine has listed the
/// device, so the bar starts without a length and adopts one on the first
/// update.
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Create a bar waiting for the first update
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("Listing device files...");
        Self { bar }
    }

    /// Update position and message from an engine progress callback
    pub fn update(&self, index: usize, total: usize, current: &str) {
        if self.bar.length().is_none() {
            self.bar.disable_steady_tick();
            self.bar.set_style(transfer_style());
            self.bar.set_length(total as u64);
        }

        let display_name: String = current
            .rsplit('/')
            .next()
            .unwrap_or(current)
            .chars()
            .take(30)
            .collect();
        self.bar.set_position(index as u64);
        self.bar.set_message(display_name);
    }

    /// Finish the bar with a closing message
    pub fn finish(&self, msg: &str) {
        self.bar.finish_with_message(msg.to_string());
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a spinner for an indeterminate operation
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(spinner_style());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message(msg.to_string());
    bar
}

/// Print a success message with checkmark
pub fn print_success(msg: &str) {
    println!("  ✓ {}", msg);
}

/// Print an info message with bullet
pub fn print_info(msg: &str) {
    println!("  • {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("  ⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    println!("  ✗ {}", msg);
}
