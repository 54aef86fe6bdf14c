//! Byte ranges into blueprint source text.

use std::ops::Range;

/// A half-open byte range `start..end` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Locates a 1-based line/column position, as reported by `serde_json`,
    /// in `source` and returns a span covering the character there.
    ///
    /// Positions past the end of the input are clamped to the last character.
    pub(crate) fn from_line_column(source: &str, line: usize, column: usize) -> Self {
        let line_start: usize = source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        let mut offset = (line_start + column.saturating_sub(1)).min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let width = source[offset..].chars().next().map_or(0, char::len_utf8);
        if width > 0 {
            return Self::new(offset..offset + width);
        }

        // At end of input: point at the last character instead.
        match source.char_indices().next_back() {
            Some((last, ch)) => Self::new(last..last + ch.len_utf8()),
            None => Self::default(),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}
