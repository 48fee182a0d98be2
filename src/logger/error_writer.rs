//! `std::io::Write` adapter producing ERROR records.
//!
//! Lets code that only knows how to write bytes (other logging frameworks,
//! child process stderr, `writeln!`) feed a [`Logger`]. Each `write` call
//! becomes one record with a single trailing newline trimmed. The reported
//! location is the adapter itself, not the original writer.

use std::io;
use std::panic::Location;

use super::Logger;

/// Logs each write as an ERROR record. Never fails and never notifies
/// reporters.
#[derive(Debug, Clone)]
pub struct ErrorWriter {
    logger: Logger,
}

impl ErrorWriter {
    pub(crate) fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl io::Write for ErrorWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let text = text.strip_suffix('\n').unwrap_or(&text);
        self.logger.error_record_at(Location::caller(), text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
