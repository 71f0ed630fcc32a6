//! The streaming rewrite loop: chunked reader → transform → pending output.
//!
//! The engine knows nothing about files. In-place rewriting, dry runs and
//! `show` all drive the same loop with different sinks.

use crate::reader::{ChunkedReader, DEFAULT_CHUNK_SIZE};
use crate::transform::Transform;
use std::io::{self, Read, Write};
use thiserror::Error;

pub const DEFAULT_BUFFER_CAPACITY: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub chunk_size: usize,
    /// Pending output is flushed once it reaches this many bytes.
    pub buffer_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Which side of the stream failed.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

/// Accumulated transformed bytes awaiting a write to the sink.
#[derive(Debug)]
pub struct PendingOutput<W: Write> {
    sink: W,
    buf: Vec<u8>,
    capacity: usize,
    written: u64,
}

impl<W: Write> PendingOutput<W> {
    pub fn new(sink: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sink,
            // Transforms may expand a chunk past capacity before we flush.
            buf: Vec::with_capacity(capacity * 2),
            capacity,
            written: 0,
        }
    }

    pub fn buffer(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Flush if the buffer has reached capacity.
    pub fn maybe_flush(&mut self) -> io::Result<()> {
        if self.buf.len() >= self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.sink.write_all(&self.buf)?;
            self.written += self.buf.len() as u64;
            self.buf.clear();
        }
        self.sink.flush()
    }

    /// Total bytes handed to the sink so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

/// Stream `reader` through `transform` into `writer`.
///
/// Returns the transform's effect count. On error, whatever reached
/// `writer` is incomplete and must be discarded by the caller.
pub fn run<R, W>(
    reader: R,
    writer: W,
    transform: &mut dyn Transform,
    options: EngineOptions,
) -> Result<u64, StreamError>
where
    R: Read,
    W: Write,
{
    let mut chunks = ChunkedReader::new(reader, options.chunk_size);
    let mut pending = PendingOutput::new(writer, options.buffer_capacity);

    while let Some(chunk) = chunks.next_chunk().map_err(StreamError::Read)? {
        transform.feed(chunk, pending.buffer());
        pending.maybe_flush().map_err(StreamError::Write)?;
    }
    transform.finish(pending.buffer());
    pending.flush().map_err(StreamError::Write)?;

    log::trace!(
        "stream done: {} bytes out, {} changes",
        pending.written(),
        transform.changes()
    );
    Ok(transform.changes())
}

/// Transform an in-memory buffer.
pub fn run_to_vec(
    input: &[u8],
    transform: &mut dyn Transform,
    options: EngineOptions,
) -> Result<(Vec<u8>, u64), StreamError> {
    let mut out = Vec::with_capacity(input.len());
    let changes = run(input, &mut out, transform, options)?;
    Ok((out, changes))
}
