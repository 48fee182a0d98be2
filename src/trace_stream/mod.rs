//! Trace stream adapter.
//!
//! # Data Flow
//! ```text
//! producer (e.g. child process stdout)
//!     → TraceWriter (AsyncWrite, write half of a duplex pipe)
//!     → pump task: BufReader::read_until('\n') on the read half
//!     → Logger TRACE record per line, newline trimmed
//!     → debug sink
//! ```
//!
//! # Design Decisions
//! - Exactly one pump per writer, started when the writer is created
//! - The pump stops at the first read failure or end of stream, after
//!   logging one closing line; both pipe halves are dropped with it
//! - With tracing disabled there is no pipe and no pump: writes are
//!   accepted and discarded, so producers can never stall on a full pipe
//! - Outside a tokio runtime the pump runs on its own thread with a
//!   current-thread runtime

use std::io;
use std::panic::Location;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::logger::Logger;

/// Pipe capacity between producer and pump.
pub const PIPE_CAPACITY: usize = 64 * 1024;

/// Writable stream whose lines become TRACE records.
#[derive(Debug)]
pub struct TraceWriter {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Discard,
    Pipe {
        writer: DuplexStream,
        done: Option<oneshot::Receiver<()>>,
    },
}

impl TraceWriter {
    pub(crate) fn new(logger: Logger) -> Self {
        if !logger.is_trace_enabled() {
            return Self {
                inner: Inner::Discard,
            };
        }

        let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
        let (done_tx, done_rx) = oneshot::channel();
        let name = logger.name().to_owned();
        let pump = async move {
            pump(logger, reader).await;
            let _ = done_tx.send(());
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(pump);
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name(format!("sublog-trace-{}", name))
                    .spawn(move || {
                        match tokio::runtime::Builder::new_current_thread()
                            .enable_all()
                            .build()
                        {
                            Ok(rt) => rt.block_on(pump),
                            Err(e) => tracing::error!(error = %e, "trace pump runtime failed to start"),
                        }
                    });
                if let Err(e) = spawned {
                    tracing::error!(error = %e, subsystem = %name, "trace pump thread failed to start");
                }
            }
        }
        tracing::debug!(subsystem = %name, "trace pump started");

        Self {
            inner: Inner::Pipe {
                writer,
                done: Some(done_rx),
            },
        }
    }

    /// True if writes are discarded.
    pub fn is_discarding(&self) -> bool {
        matches!(self.inner, Inner::Discard)
    }

    /// Close the stream and wait for the pump to log everything written.
    pub async fn close(mut self) -> io::Result<()> {
        if let Inner::Pipe { writer, done } = &mut self.inner {
            writer.shutdown().await?;
            if let Some(done) = done.take() {
                // An error only means the pump is already gone.
                let _ = done.await;
            }
        }
        Ok(())
    }
}

impl AsyncWrite for TraceWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.get_mut().inner {
            Inner::Discard => Poll::Ready(Ok(buf.len())),
            Inner::Pipe { writer, .. } => Pin::new(writer).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().inner {
            Inner::Discard => Poll::Ready(Ok(())),
            Inner::Pipe { writer, .. } => Pin::new(writer).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().inner {
            Inner::Discard => Poll::Ready(Ok(())),
            Inner::Pipe { writer, .. } => Pin::new(writer).poll_shutdown(cx),
        }
    }
}

async fn pump(logger: Logger, reader: DuplexStream) {
    let location = Location::caller();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => {
                closed(&logger, location, &"end of stream");
                break;
            }
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                // A final line without terminator is still logged; the next
                // read reports end of stream.
                logger.trace_at(location, &*String::from_utf8_lossy(&line));
            }
            Err(e) => {
                closed(&logger, location, &e);
                break;
            }
        }
    }
    tracing::debug!(subsystem = %logger.name(), "trace pump stopped");
}

fn closed(logger: &Logger, location: &Location<'_>, reason: &dyn std::fmt::Display) {
    let reason = reason.to_string();
    logger.tracef_at(
        location,
        "TraceWriter closed due to unexpected error: {}",
        &[&reason],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogConfig, TraceSetting};
    use crate::facility::Facility;
    use crate::output::{MemorySink, OutputPair};
    use std::sync::Arc;

    fn logger(trace: TraceSetting) -> (Logger, MemorySink) {
        let debug = MemorySink::new();
        let facility = Arc::new(Facility::with_outputs(OutputPair::new(
            Arc::new(MemorySink::new()),
            Arc::new(debug.clone()),
        )));
        let log = Logger::builder("pump")
            .config(LogConfig {
                trace,
                print_stack: false,
            })
            .facility(facility)
            .build();
        (log, debug)
    }

    #[tokio::test]
    async fn test_disabled_discards() {
        let (log, debug) = logger(TraceSetting::Off);
        let mut out = log.trace_out();
        assert!(out.is_discarding());

        // Far more than the pipe could hold.
        let chunk = vec![b'x'; PIPE_CAPACITY];
        for _ in 0..4 {
            out.write_all(&chunk).await.unwrap();
        }
        out.close().await.unwrap();
        assert!(debug.is_empty());
    }

    #[tokio::test]
    async fn test_lines_become_records() {
        let (log, debug) = logger(TraceSetting::All);
        let mut out = log.trace_out();
        out.write_all(b"one\ntwo\nthr").await.unwrap();
        out.write_all(b"ee\n").await.unwrap();
        out.close().await.unwrap();

        let lines = debug.lines();
        assert_eq!(lines.len(), 4, "{:?}", lines);
        assert!(lines[0].starts_with("TRACE pump: mod.rs:"));
        assert!(lines[0].ends_with(" one"));
        assert!(lines[1].ends_with(" two"));
        assert!(lines[2].ends_with(" three"));
        assert!(lines[3].ends_with("TraceWriter closed due to unexpected error: end of stream"));
    }

    #[tokio::test]
    async fn test_unterminated_tail_logged() {
        let (log, debug) = logger(TraceSetting::All);
        let mut out = log.trace_out();
        out.write_all(b"tail").await.unwrap();
        out.close().await.unwrap();

        let lines = debug.lines();
        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[0].ends_with(" tail"));
    }

    #[test]
    fn test_pump_without_runtime() {
        let (log, debug) = logger(TraceSetting::All);
        let out = log.trace_out();
        assert!(!out.is_discarding());

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let mut out = out;
            out.write_all(b"from thread\n").await.unwrap();
            out.close().await.unwrap();
        });
        assert!(debug.lines()[0].ends_with(" from thread"));
    }
}
