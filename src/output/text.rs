//! Text report formatter for human-readable display
//!
//! One line per dependency with a colored status, per-delivery detail in
//! verbose mode, and a closing summary line.

use crate::domain::{DepStatus, ScanReport};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::{self, Write};

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn status_label(status: &DepStatus) -> String {
        match status {
            DepStatus::UpToDate => "up-to-date".dimmed().to_string(),
            DepStatus::Notified { version } => {
                format!("{} {}", "new release notified:".green().bold(), version)
            }
            DepStatus::NotifyFailed { version } => {
                format!("{} {}", "notification failed for".red().bold(), version)
            }
            DepStatus::CheckFailed { reason } => {
                format!("{} {}", "check failed:".red(), reason)
            }
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &ScanReport, out: &mut dyn Write) -> io::Result<()> {
        let quiet = self.verbosity == Verbosity::Quiet;
        let verbose = self.verbosity == Verbosity::Verbose;

        if !quiet {
            let mode = if report.dry_run { " (dry-run)" } else { "" };
            writeln!(out, "{}{}", "Scan pass finished".bold(), mode)?;
        }

        for outcome in &report.outcomes {
            let failed = matches!(
                outcome.status,
                DepStatus::NotifyFailed { .. } | DepStatus::CheckFailed { .. }
            );
            if quiet && !failed {
                continue;
            }

            writeln!(
                out,
                "  {:<30} {}",
                outcome.dependency,
                Self::status_label(&outcome.status)
            )?;

            if verbose {
                for delivery in &outcome.deliveries {
                    let mark = if delivery.delivered {
                        "delivered".green().to_string()
                    } else {
                        format!(
                            "{} ({})",
                            "failed".red(),
                            delivery.error.as_deref().unwrap_or("unknown")
                        )
                    };
                    writeln!(out, "    -> {} {}", delivery.repo, mark)?;
                }
            }
        }

        if verbose && !report.errors.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", "Errors encountered:".yellow())?;
            for error in &report.errors {
                writeln!(out, "  - {}", error)?;
            }
        }

        if !quiet {
            writeln!(
                out,
                "{} {} notified, {} up-to-date, {} failed",
                "Summary:".bold(),
                report.notified_count(),
                report.up_to_date_count(),
                report.failed_count()
            )?;
        }

        Ok(())
    }
}
