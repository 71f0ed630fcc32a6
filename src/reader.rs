//! Bounded-chunk reading.

use std::io::{self, ErrorKind, Read};

pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Supplies successive byte chunks of at most `chunk_size` bytes.
///
/// Chunks carry no alignment guarantee: a token may be split anywhere.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    inner: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> ChunkedReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            buf: vec![0; chunk_size.max(1)],
            done: false,
        }
    }

    /// Read the next chunk. Returns `Ok(None)` at end of input.
    ///
    /// Interrupted reads are retried; any other error is returned as is.
    pub fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        if self.done {
            return Ok(None);
        }
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return Ok(None);
                }
                Ok(n) => return Ok(Some(&self.buf[..n])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.buf.len()
    }
}
