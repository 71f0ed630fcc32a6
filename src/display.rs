//! Read-only rendering of a file with line numbers, as used by `show`.
//!
//! The file is streamed through [`TabConvert`] in display mode (tabs
//! expanded, control bytes escaped) and into a [`LineNumbers`] sink.

use crate::commit::RewriteError;
use crate::engine::{self, EngineOptions, StreamError};
use crate::transform::{ColumnOptions, TabConvert};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Width of the line number gutter.
const GUTTER: usize = 6;

/// A writer that prefixes every line with its number.
#[derive(Debug)]
pub struct LineNumbers<W> {
    inner: W,
    line: u64,
    at_line_start: bool,
}

impl<W: Write> LineNumbers<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: 0,
            at_line_start: true,
        }
    }

    /// Lines started so far.
    pub fn lines(&self) -> u64 {
        self.line
    }

    /// True when the last line written was terminated.
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    fn start_line(&mut self) -> io::Result<()> {
        self.line += 1;
        self.at_line_start = false;
        write!(self.inner, "{:>GUTTER$}  ", self.line, GUTTER = GUTTER)
    }
}

impl<W: Write> Write for LineNumbers<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while !rest.is_empty() {
            if self.at_line_start {
                self.start_line()?;
            }
            match rest.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.inner.write_all(&rest[..=end])?;
                    self.at_line_start = true;
                    rest = &rest[end + 1..];
                }
                None => {
                    self.inner.write_all(rest)?;
                    rest = &[];
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Render `path` to `out`. Returns the number of lines written.
///
/// An unterminated last line is terminated on output.
pub fn show_file<W: Write>(
    path: &Path,
    out: W,
    options: ColumnOptions,
    engine_options: EngineOptions,
) -> Result<u64, RewriteError> {
    let source = File::open(path).map_err(|source| RewriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut numbered = LineNumbers::new(out);
    let mut transform = TabConvert::new(options);
    let write_error = |source| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };
    match engine::run(&source, &mut numbered, &mut transform, engine_options) {
        Ok(_) => {}
        Err(StreamError::Read(source)) => {
            return Err(RewriteError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(StreamError::Write(source)) => return Err(write_error(source)),
    }
    if !numbered.at_line_start() {
        numbered.write_all(b"\n").map_err(write_error)?;
    }
    Ok(numbered.lines())
}
