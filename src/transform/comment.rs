//! `//` line comment neutralization.
//!
//! Rewrites every top-level `//` comment into a `/* ... */` block comment so
//! the source stays valid for compilers that only accept block comments.
//! Quoted literals and existing block comments pass through unchanged.
//!
//! Lexical state is line scoped, with one exception: an open block comment
//! carries across line boundaries (and across chunk boundaries).

use super::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Normal,
    BlockComment,
    LineComment,
}

#[derive(Debug)]
pub struct CommentNeutralizer {
    careful: bool,
    context: Context,
    /// Open quote character, only meaningful in `Context::Normal`.
    quote: Option<u8>,
    escaped: bool,
    /// Previous byte that can still form a two-byte token.
    prev: Option<u8>,
    /// Last byte written while inside a synthesized block comment.
    last_emitted: u8,
    /// Careful mode tripped: copy the rest of this line verbatim.
    dont_change: bool,
    /// A `//` was passed over on a verbatim line.
    verbatim_comment: bool,
    changes: u64,
}

impl CommentNeutralizer {
    pub fn new(careful: bool) -> Self {
        Self {
            careful,
            context: Context::Normal,
            quote: None,
            escaped: false,
            prev: None,
            last_emitted: b'\n',
            dont_change: false,
            verbatim_comment: false,
            changes: 0,
        }
    }

    /// Emit the closing `*/` of a synthesized comment.
    fn close_line_comment(&mut self, out: &mut Vec<u8>) {
        if !self.last_emitted.is_ascii_whitespace() {
            out.push(b' ');
        }
        out.extend_from_slice(b"*/");
        self.context = Context::Normal;
    }

    fn end_of_line(&mut self, byte: u8, out: &mut Vec<u8>) {
        if self.context == Context::LineComment {
            self.close_line_comment(out);
        }
        out.push(byte);
        self.prev = None;
        self.quote = None;
        self.escaped = false;
        self.dont_change = false;
        self.verbatim_comment = false;
    }

    fn step(&mut self, byte: u8, out: &mut Vec<u8>) {
        if byte == b'\r' || byte == b'\n' {
            self.end_of_line(byte, out);
            return;
        }
        match self.context {
            Context::LineComment => {
                // A `*/` inside the text would end our comment early.
                if byte == b'/' && self.last_emitted == b'*' {
                    return;
                }
                out.push(byte);
                self.last_emitted = byte;
            }
            Context::BlockComment => {
                out.push(byte);
                if byte == b'/' && self.prev == Some(b'*') {
                    self.context = Context::Normal;
                    self.prev = None;
                } else {
                    self.prev = Some(byte);
                }
            }
            Context::Normal if self.dont_change => {
                out.push(byte);
                self.track_verbatim(byte);
            }
            Context::Normal => self.step_normal(byte, out),
        }
    }

    fn step_quote(&mut self, open: u8, byte: u8) {
        if self.escaped {
            self.escaped = false;
        } else if byte == b'\\' {
            self.escaped = true;
        } else if byte == open {
            self.quote = None;
        }
        self.prev = None;
    }

    /// Follow quotes and comment openers on a line that is copied
    /// unchanged, so a `/*` opened there still holds on the next line.
    fn track_verbatim(&mut self, byte: u8) {
        if self.verbatim_comment {
            return;
        }
        if let Some(open) = self.quote {
            self.step_quote(open, byte);
            return;
        }
        match byte {
            b'"' | b'\'' => {
                self.quote = Some(byte);
                self.prev = None;
            }
            b'*' if self.prev == Some(b'/') => {
                self.context = Context::BlockComment;
                self.prev = None;
            }
            b'/' if self.prev == Some(b'/') => self.verbatim_comment = true,
            _ => self.prev = Some(byte),
        }
    }

    fn step_normal(&mut self, byte: u8, out: &mut Vec<u8>) {
        if let Some(open) = self.quote {
            out.push(byte);
            self.step_quote(open, byte);
            return;
        }

        match byte {
            b'"' | b'\'' if self.careful => {
                self.dont_change = true;
                self.quote = Some(byte);
                self.prev = None;
                out.push(byte);
            }
            b'"' | b'\'' => {
                self.quote = Some(byte);
                out.push(byte);
                self.prev = None;
            }
            b'*' if self.prev == Some(b'/') => {
                self.context = Context::BlockComment;
                out.push(byte);
                self.prev = None;
            }
            b'/' if self.prev == Some(b'/') => {
                self.context = Context::LineComment;
                out.push(b'*');
                // `/*/` does not close, so the opener's `*` never pairs with a `/`.
                self.last_emitted = b'/';
                self.prev = None;
                self.changes += 1;
            }
            _ => {
                out.push(byte);
                self.prev = Some(byte);
            }
        }
    }
}

impl Transform for CommentNeutralizer {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len());
        for &byte in input {
            self.step(byte, out);
        }
    }

    fn finish(&mut self, out: &mut Vec<u8>) {
        if self.context == Context::LineComment {
            self.close_line_comment(out);
        }
    }

    fn changes(&self) -> u64 {
        self.changes
    }
}
