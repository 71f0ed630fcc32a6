//! Column-tracking transforms: tab expansion, tab compression, and the
//! display rendering used by `show`.
//!
//! Whitespace is never copied directly. Spaces and tabs only move a pending
//! target column; the gap is materialized with the cheapest fill when the
//! next visible byte arrives. Whitespace that no visible byte follows on
//! its line is dropped.

use super::Transform;
use serde::Deserialize;

pub const MAX_TAB_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TabDirection {
    /// Tabs to spaces.
    Expand,
    /// Spaces to tabs where a tab reaches the same column.
    Compress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOptions {
    pub direction: TabDirection,
    pub tab_size: usize,
    /// Escape control bytes as `^X` (display only).
    pub escape_controls: bool,
    /// Escape bytes at or above `high_boundary` as `M-x` (display only).
    pub escape_high: bool,
    /// First byte value treated as "high". 128 leaves DEL to the control
    /// escape; 127 folds DEL into the high range.
    pub high_boundary: u8,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            direction: TabDirection::Expand,
            tab_size: 8,
            escape_controls: false,
            escape_high: false,
            high_boundary: 128,
        }
    }
}

impl ColumnOptions {
    /// Options for rendering a file to a terminal.
    pub fn display(tab_size: usize, escape_high: bool) -> Self {
        Self {
            direction: TabDirection::Expand,
            tab_size,
            escape_controls: true,
            escape_high,
            high_boundary: 128,
        }
    }
}

#[derive(Debug)]
pub struct TabConvert {
    options: ColumnOptions,
    /// Column reached by bytes already written.
    column: usize,
    /// Column the pending whitespace run would reach.
    pending: usize,
    /// Raw bytes of the pending whitespace run.
    run: Vec<u8>,
    changes: u64,
}

impl TabConvert {
    pub fn new(options: ColumnOptions) -> Self {
        Self {
            options: ColumnOptions {
                tab_size: options.tab_size.max(1),
                ..options
            },
            column: 0,
            pending: 0,
            run: Vec::new(),
            changes: 0,
        }
    }

    fn next_stop(&self, column: usize) -> usize {
        let size = self.options.tab_size;
        (column / size + 1) * size
    }

    fn fill(&self, out: &mut Vec<u8>) {
        let target = self.pending;
        let mut column = self.column;
        if self.options.direction == TabDirection::Compress {
            loop {
                let stop = self.next_stop(column);
                if stop > target {
                    break;
                }
                // One column costs a byte either way; keep it a space.
                out.push(if stop - column == 1 { b' ' } else { b'\t' });
                column = stop;
            }
        }
        out.resize(out.len() + (target - column), b' ');
    }

    /// Write the pending whitespace run, counting it if its bytes changed.
    fn materialize(&mut self, out: &mut Vec<u8>) {
        if self.run.is_empty() {
            return;
        }
        let start = out.len();
        self.fill(out);
        if out[start..] != self.run[..] {
            self.changes += 1;
        }
        self.column = self.pending;
        self.run.clear();
    }

    fn end_line(&mut self, byte: u8, out: &mut Vec<u8>) {
        if !self.run.is_empty() {
            self.changes += 1;
            self.run.clear();
        }
        out.push(byte);
        self.column = 0;
        self.pending = 0;
    }

    fn emit_visible(&mut self, byte: u8, out: &mut Vec<u8>) {
        self.materialize(out);
        let width = if self.options.escape_high && byte >= self.options.high_boundary {
            out.extend_from_slice(b"M-");
            let low = byte & 0x7f;
            2 + self.emit_plain(low, out)
        } else {
            self.emit_plain(byte, out)
        };
        self.column += width;
        self.pending = self.column;
    }

    /// Emit one byte, escaping control bytes if configured. Returns its width.
    fn emit_plain(&self, byte: u8, out: &mut Vec<u8>) -> usize {
        if self.options.escape_controls && (byte < 0x20 || byte == 0x7f) {
            out.push(b'^');
            out.push(if byte == 0x7f { b'?' } else { byte + b'@' });
            2
        } else {
            out.push(byte);
            1
        }
    }
}

impl Transform for TabConvert {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len());
        for &byte in input {
            match byte {
                b' ' => {
                    self.pending += 1;
                    self.run.push(byte);
                }
                b'\t' => {
                    self.pending = self.next_stop(self.pending);
                    self.run.push(byte);
                }
                b'\n' | b'\r' => self.end_line(byte, out),
                _ => self.emit_visible(byte, out),
            }
        }
    }

    fn finish(&mut self, _out: &mut Vec<u8>) {
        if !self.run.is_empty() {
            self.changes += 1;
            self.run.clear();
        }
    }

    fn changes(&self) -> u64 {
        self.changes
    }
}
