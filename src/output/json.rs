//! JSON report formatter

use crate::domain::ScanReport;
use crate::output::OutputFormatter;
use std::io::{self, Write};

/// Serializes the full scan report as pretty-printed JSON
#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ScanReport, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(out)
    }
}
