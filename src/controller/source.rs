//! # Report Source Module
//!
//! Reads a stream of [`InputReport`]s, one JSON object per line, from any
//! async buffered reader. The binary feeds it stdin, so a joystick topic can
//! be piped straight in:
//!
//! ```text
//! {"axes": [0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0], "buttons": [0, 1, 0, 0, 0]}
//! ```
//!
//! Blank lines are skipped and malformed lines are logged and dropped; only
//! I/O errors end the stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{trace, warn};

use super::report::InputReport;
use crate::error::Result;

/// Line-delimited JSON report reader.
pub struct ReportSource<R> {
    lines: Lines<R>,
    line_number: u64,
    rejected: u64,
}

impl<R: AsyncBufRead + Unpin> ReportSource<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            rejected: 0,
        }
    }

    /// Returns the next well-formed report, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the underlying reader fails.
    pub async fn next_report(&mut self) -> Result<Option<InputReport>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<InputReport>(line) {
                Ok(report) => {
                    trace!("Report {}: {:?}", self.line_number, report);
                    return Ok(Some(report));
                }
                Err(e) => {
                    self.rejected += 1;
                    warn!("Skipping malformed report on line {}: {}", self.line_number, e);
                }
            }
        }

        Ok(None)
    }

    /// Number of lines dropped as malformed so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}
