//! Byte sinks records are written to.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// A destination for formatted records.
///
/// Each call receives one complete record; implementations must write it
/// without interleaving it with concurrent records.
pub trait LogSink: Send + Sync {
    fn write_record(&self, record: &[u8]) -> io::Result<()>;
}

/// Shared handle to a sink.
pub type Sink = Arc<dyn LogSink>;

/// The process's standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(record)
    }
}

/// The process's standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(record)?;
        out.flush()
    }
}

/// Adapts any [`Write`] into a sink.
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut w = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        w.write_all(record)?;
        w.flush()
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink").finish_non_exhaustive()
    }
}

/// An in-memory sink; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Everything written so far, split into lines without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything written so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        self.lock().extend_from_slice(record);
        Ok(())
    }
}

/// A sink whose writes always fail. Useful for exercising the
/// logging-failure path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSink;

impl LogSink for FailingSink {
    fn write_record(&self, _record: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }
}
