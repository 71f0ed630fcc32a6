//! Carry-state byte transformers.
//!
//! Every rewrite tool compiles down to a single capability: [`Transform`],
//! which consumes a chunk of input bytes, updates its own carry-over state,
//! and appends output bytes. Chunk boundaries are arbitrary; a transform
//! must produce the same output no matter how its input is split.

pub mod case;
pub mod column;
pub mod comment;
pub mod line_ending;
pub mod marker;
pub mod matcher;
pub mod range;

pub use case::{CaseFold, CaseMode};
pub use column::{ColumnOptions, TabConvert, TabDirection};
pub use comment::CommentNeutralizer;
pub use line_ending::{LineEnding, LineEndingConvert};
pub use marker::{MarkerOptions, MarkerSubstitute, NumberBase};
pub use matcher::{MatchStep, PartialMatch};
pub use range::RangeDelete;

use serde::Deserialize;

/// One streaming transformation over a single file.
///
/// A transform value is created per file and dropped when that file is done;
/// it is never reused across files.
pub trait Transform {
    /// Consume `input`, appending transformed bytes to `out`.
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>);

    /// Flush any state still held back at end of input.
    fn finish(&mut self, out: &mut Vec<u8>);

    /// Number of changes made so far (the file's effect count).
    fn changes(&self) -> u64;
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        (**self).feed(input, out)
    }

    fn finish(&mut self, out: &mut Vec<u8>) {
        (**self).finish(out)
    }

    fn changes(&self) -> u64 {
        (**self).changes()
    }
}

/// Which rewrite a batch applies, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Mode {
    CaseFold {
        mode: CaseMode,
    },
    TabConvert {
        direction: TabDirection,
        #[serde(default = "default_tab_size")]
        tab_size: usize,
    },
    CommentNeutralize {
        #[serde(default)]
        careful: bool,
    },
    MarkerSubstitute(MarkerOptions),
    RangeDelete {
        start: u64,
        end: u64,
        #[serde(default)]
        end_inclusive: bool,
    },
    LineEndingConvert {
        target: LineEnding,
    },
}

pub(crate) fn default_tab_size() -> usize {
    8
}

impl Mode {
    /// Build a fresh transform for one file.
    pub fn build(&self) -> Box<dyn Transform> {
        match self {
            Mode::CaseFold { mode } => Box::new(CaseFold::new(*mode)),
            Mode::TabConvert {
                direction,
                tab_size,
            } => Box::new(TabConvert::new(ColumnOptions {
                direction: *direction,
                tab_size: *tab_size,
                ..ColumnOptions::default()
            })),
            Mode::CommentNeutralize { careful } => Box::new(CommentNeutralizer::new(*careful)),
            Mode::MarkerSubstitute(options) => Box::new(MarkerSubstitute::new(options.clone())),
            Mode::RangeDelete {
                start,
                end,
                end_inclusive,
            } => Box::new(RangeDelete::new(*start, *end, *end_inclusive)),
            Mode::LineEndingConvert { target } => Box::new(LineEndingConvert::new(*target)),
        }
    }

    /// Short tool name used in reports and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::CaseFold { .. } => "case",
            Mode::TabConvert { .. } => "tabs",
            Mode::CommentNeutralize { .. } => "comments",
            Mode::MarkerSubstitute(_) => "number",
            Mode::RangeDelete { .. } => "cut",
            Mode::LineEndingConvert { .. } => "eol",
        }
    }

    /// What one unit of this mode's effect count means, for reporting.
    pub fn unit(&self) -> &'static str {
        match self {
            Mode::CaseFold { .. } => "bytes folded",
            Mode::TabConvert { .. } => "runs rewritten",
            Mode::CommentNeutralize { .. } => "comments converted",
            Mode::MarkerSubstitute(_) => "markers numbered",
            Mode::RangeDelete { .. } => "bytes deleted",
            Mode::LineEndingConvert { .. } => "line endings changed",
        }
    }
}

/// Run `transform` over `input` split into `chunk`-sized pieces.
///
/// Test helper shared by the variant modules.
#[cfg(test)]
pub(crate) fn run_chunked(transform: &mut dyn Transform, input: &[u8], chunk: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for piece in input.chunks(chunk.max(1)) {
        transform.feed(piece, &mut out);
    }
    transform.finish(&mut out);
    out
}
