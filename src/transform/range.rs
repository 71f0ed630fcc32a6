use super::Transform;

/// Delete the bytes at file offsets `start..end` (or `start..=end`).
///
/// Offsets are absolute within the file, so the transform counts every
/// byte it has seen across chunks. Ranges past end of file delete nothing.
#[derive(Debug)]
pub struct RangeDelete {
    start: u64,
    /// Exclusive end offset.
    end: u64,
    offset: u64,
    changes: u64,
}

impl RangeDelete {
    pub fn new(start: u64, end: u64, end_inclusive: bool) -> Self {
        let end = if end_inclusive {
            end.saturating_add(1)
        } else {
            end
        };
        Self {
            start,
            end,
            offset: 0,
            changes: 0,
        }
    }
}

impl Transform for RangeDelete {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        let chunk_start = self.offset;
        let chunk_end = chunk_start + input.len() as u64;
        self.offset = chunk_end;

        let cut_start = self.start.clamp(chunk_start, chunk_end);
        let cut_end = self.end.clamp(cut_start, chunk_end);
        let lo = (cut_start - chunk_start) as usize;
        let hi = (cut_end - chunk_start) as usize;

        out.extend_from_slice(&input[..lo]);
        out.extend_from_slice(&input[hi..]);
        self.changes += (hi - lo) as u64;
    }

    fn finish(&mut self, _out: &mut Vec<u8>) {}

    fn changes(&self) -> u64 {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::run_chunked;

    fn cut(start: u64, end: u64, inclusive: bool, input: &[u8], chunk: usize) -> (Vec<u8>, u64) {
        let mut t = RangeDelete::new(start, end, inclusive);
        let out = run_chunked(&mut t, input, chunk);
        (out, t.changes())
    }

    #[test]
    fn test_exclusive_end() {
        let (out, n) = cut(2, 5, false, b"0123456789", 3);
        assert_eq!(out, b"0156789");
        assert_eq!(n, 3);
    }

    #[test]
    fn test_inclusive_end() {
        let (out, n) = cut(2, 5, true, b"0123456789", 3);
        assert_eq!(out, b"016789");
        assert_eq!(n, 4);
    }

    #[test]
    fn test_inclusive_single_byte() {
        let (out, n) = cut(0, 0, true, b"abc", 1);
        assert_eq!(out, b"bc");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_range_past_eof() {
        let (out, n) = cut(20, 30, false, b"short", 2);
        assert_eq!(out, b"short");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_range_straddles_eof() {
        let (out, n) = cut(3, 100, true, b"abcdef", 4);
        assert_eq!(out, b"abc");
        assert_eq!(n, 3);
    }

    #[test]
    fn test_chunking_is_irrelevant() {
        let input: Vec<u8> = (0..=255).collect();
        let (expected, _) = cut(17, 200, false, &input, input.len());
        for chunk in [1, 7, 16, 64, 255] {
            assert_eq!(cut(17, 200, false, &input, chunk).0, expected);
        }
    }
}
