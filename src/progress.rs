//! Scan progress display
//!
//! A single spinner that names the repository or dependency currently
//! being worked on. Disabled in quiet mode and whenever stdout is not a
//! terminal's concern (JSON output).

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a scan pass runs
pub struct ScanProgress {
    bar: Option<ProgressBar>,
}

impl ScanProgress {
    /// Create a progress display; `enabled = false` yields a no-op
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(spinner) }
    }

    /// Update the spinner message
    pub fn message(&self, msg: impl Into<String>) {
        if let Some(bar) = &self.bar {
            bar.set_message(msg.into());
        }
    }

    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_is_inert() {
        let progress = ScanProgress::new(false);
        progress.message("checking cfitsio");
        progress.finish();
    }
}
