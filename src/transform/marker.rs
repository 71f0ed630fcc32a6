//! Numbered-marker substitution.
//!
//! Replaces every occurrence of a literal marker (default `/* # */`) with an
//! incrementing number, e.g. to renumber test cases or message ids.

use super::matcher::{MatchStep, PartialMatch};
use super::Transform;
use serde::Deserialize;

pub const DEFAULT_MARKER: &str = "/* # */";
pub const MAX_START: u64 = 999_999_999;
pub const MAX_STEP: u64 = 1000;
pub const MAX_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NumberBase {
    #[default]
    Decimal,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkerOptions {
    pub marker: String,
    pub start: u64,
    pub step: u64,
    /// Minimum field width; 0 means no padding.
    pub width: usize,
    pub zero_pad: bool,
    pub base: NumberBase,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            start: 1,
            step: 1,
            width: 0,
            zero_pad: false,
            base: NumberBase::Decimal,
        }
    }
}

impl MarkerOptions {
    pub fn format(&self, value: u64) -> String {
        let width = self.width;
        match (self.base, self.zero_pad) {
            (NumberBase::Decimal, false) => format!("{value:>width$}"),
            (NumberBase::Decimal, true) => format!("{value:0width$}"),
            (NumberBase::Hex, false) => format!("{value:>width$X}"),
            (NumberBase::Hex, true) => format!("{value:0width$X}"),
        }
    }
}

#[derive(Debug)]
pub struct MarkerSubstitute {
    options: MarkerOptions,
    matcher: PartialMatch,
    next: u64,
    changes: u64,
}

impl MarkerSubstitute {
    pub fn new(options: MarkerOptions) -> Self {
        let matcher = PartialMatch::new(options.marker.as_bytes());
        Self {
            next: options.start,
            options,
            matcher,
            changes: 0,
        }
    }

    /// The value the next substitution will use.
    pub fn next_value(&self) -> u64 {
        self.next
    }
}

impl Transform for MarkerSubstitute {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len());
        for &byte in input {
            match self.matcher.push(byte) {
                MatchStep::Pending => {}
                MatchStep::Matched => {
                    out.extend_from_slice(self.options.format(self.next).as_bytes());
                    self.next = self.next.saturating_add(self.options.step);
                    self.changes += 1;
                }
                MatchStep::Released {
                    released,
                    emit_byte,
                } => {
                    out.extend_from_slice(&self.matcher.pattern()[..released]);
                    if emit_byte {
                        out.push(byte);
                    }
                }
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.matcher.drain());
    }

    fn changes(&self) -> u64 {
        self.changes
    }
}
