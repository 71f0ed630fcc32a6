use super::Transform;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LineEnding {
    /// Every LF preceded by CR.
    Crlf,
    /// Bare LF; a CR directly before an LF is removed.
    Lf,
}

/// CR/LF insertion or removal.
///
/// A CR that ends a chunk is held back until the next byte shows whether
/// it belongs to a CRLF pair.
#[derive(Debug)]
pub struct LineEndingConvert {
    target: LineEnding,
    held_cr: bool,
    changes: u64,
}

impl LineEndingConvert {
    pub fn new(target: LineEnding) -> Self {
        Self {
            target,
            held_cr: false,
            changes: 0,
        }
    }
}

impl Transform for LineEndingConvert {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len() + input.len() / 16);
        for &byte in input {
            match (self.target, byte) {
                (LineEnding::Crlf, b'\n') => {
                    if !self.held_cr {
                        out.push(b'\r');
                        self.changes += 1;
                    }
                    out.push(b'\n');
                    self.held_cr = false;
                }
                (LineEnding::Crlf, _) => {
                    out.push(byte);
                    self.held_cr = byte == b'\r';
                }
                (LineEnding::Lf, b'\r') => {
                    if self.held_cr {
                        out.push(b'\r');
                    }
                    self.held_cr = true;
                }
                (LineEnding::Lf, b'\n') => {
                    if self.held_cr {
                        self.changes += 1;
                    }
                    out.push(b'\n');
                    self.held_cr = false;
                }
                (LineEnding::Lf, _) => {
                    if self.held_cr {
                        out.push(b'\r');
                    }
                    out.push(byte);
                    self.held_cr = false;
                }
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<u8>) {
        if self.target == LineEnding::Lf && self.held_cr {
            out.push(b'\r');
        }
        self.held_cr = false;
    }

    fn changes(&self) -> u64 {
        self.changes
    }
}
