//! Partial-match buffer for literal byte sequences.
//!
//! Tracks how many leading bytes of a fixed pattern have matched so far,
//! so a match interrupted by a chunk boundary resumes with the next chunk.
//! Bytes consumed by a failed partial match are handed back to the caller
//! verbatim; nothing is ever dropped.

/// Outcome of pushing one byte through a [`PartialMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStep {
    /// The byte extended a partial match and is being held back.
    Pending,
    /// The full pattern just matched. Held bytes are consumed by the match.
    Matched,
    /// Held bytes were given up: the caller must emit `pattern[..released]`,
    /// then the byte itself if `emit_byte` is set. When `emit_byte` is clear
    /// the byte is held as part of a shorter partial match.
    Released { released: usize, emit_byte: bool },
}

#[derive(Debug, Clone)]
pub struct PartialMatch {
    pattern: Vec<u8>,
    /// `failure[i]` is the length of the longest proper border of `pattern[..=i]`.
    failure: Vec<usize>,
    progress: usize,
}

impl PartialMatch {
    /// Create a matcher for a non-empty pattern.
    pub fn new(pattern: impl Into<Vec<u8>>) -> Self {
        let pattern = pattern.into();
        assert!(!pattern.is_empty(), "match pattern must not be empty");
        let failure = failure_table(&pattern);
        Self {
            pattern,
            failure,
            progress: 0,
        }
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Advance by one input byte.
    pub fn push(&mut self, byte: u8) -> MatchStep {
        let before = self.progress;
        let mut progress = self.progress;
        while progress > 0 && self.pattern[progress] != byte {
            progress = self.failure[progress - 1];
        }

        if self.pattern[progress] == byte {
            progress += 1;
            if progress == self.pattern.len() {
                self.progress = 0;
                return MatchStep::Matched;
            }
            self.progress = progress;
            // `before + 1` bytes were held or pending; `progress` stay held.
            let released = before + 1 - progress;
            if released == 0 {
                MatchStep::Pending
            } else {
                MatchStep::Released {
                    released,
                    emit_byte: false,
                }
            }
        } else {
            self.progress = 0;
            MatchStep::Released {
                released: before,
                emit_byte: true,
            }
        }
    }

    /// Give up on any partial match, returning the held bytes.
    pub fn drain(&mut self) -> &[u8] {
        let held = self.progress;
        self.progress = 0;
        &self.pattern[..held]
    }
}

fn failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut failure = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = failure[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        failure[i] = k;
    }
    failure
}
