use std::ops::Range;

use serde::Serialize;

/// Width a tab character occupies when computing display columns.
pub const TAB_WIDTH: u32 = 4;

/// Byte-offset span into a source file. Start is inclusive, end is exclusive.
///
/// Spans stay as raw byte offsets through lexing, parsing, and checking.
/// Line/column pairs are only computed when a diagnostic is rendered, via
/// [`LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn point(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Byte range, widened to at least one byte so renderers always have
    /// something to underline.
    pub fn range(&self) -> Range<usize> {
        let start = self.start as usize;
        let end = (self.end as usize).max(start + 1);
        start..end
    }
}

/// Line starts plus the offsets of characters that do not occupy exactly one
/// column, for one source file.
///
/// Columns are 1-based and count characters: a tab is [`TAB_WIDTH`] columns,
/// a multi-byte UTF-8 character is one.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    tabs: Vec<u32>,
    /// Offset of each multi-byte character and its length minus one.
    wide_chars: Vec<(u32, u32)>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut tabs = Vec::new();
        let mut wide_chars = Vec::new();
        for (i, c) in source.char_indices() {
            let i = i as u32;
            match c {
                '\n' => line_starts.push(i + 1),
                '\t' => tabs.push(i),
                _ if c.len_utf8() > 1 => wide_chars.push((i, c.len_utf8() as u32 - 1)),
                _ => {}
            }
        }
        Self {
            line_starts,
            tabs,
            wide_chars,
        }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // partition_point yields the first line starting after `offset`.
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line_idx];

        let tabs_before = self.tabs.partition_point(|&t| t < offset)
            - self.tabs.partition_point(|&t| t < line_start);
        let wide = &self.wide_chars[self.wide_chars.partition_point(|&(w, _)| w < line_start)
            ..self.wide_chars.partition_point(|&(w, _)| w < offset)];
        let extra_bytes: u32 = wide.iter().map(|&(_, extra)| extra).sum();

        let col = offset - line_start - extra_bytes + 1 + tabs_before as u32 * (TAB_WIDTH - 1);
        ((line_idx as u32) + 1, col)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_empty() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::point(3).is_empty());
    }

    #[test]
    fn span_merge_covers_both() {
        let merged = Span::new(5, 10).merge(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
    }

    #[test]
    fn empty_span_range_is_widened() {
        assert_eq!(Span::point(4).range(), 4..5);
        assert_eq!(Span::new(2, 6).range(), 2..6);
    }

    #[test]
    fn line_col_across_lines() {
        let idx = LineIndex::new("func\nlet x\n");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(4), (1, 5));
        assert_eq!(idx.line_col(5), (2, 1));
        assert_eq!(idx.line_col(9), (2, 5));
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn tabs_count_as_four_columns() {
        let idx = LineIndex::new("a\n\t\tx");
        // 'x' sits after two tabs on line 2.
        assert_eq!(idx.line_col(4), (2, 9));
        // Tabs on an earlier line do not shift columns.
        let idx = LineIndex::new("\t\nx");
        assert_eq!(idx.line_col(2), (2, 1));
    }

    #[test]
    fn multibyte_chars_are_one_column() {
        let idx = LineIndex::new("/* \u{00E9} */ x\n\u{1F600}\ty");
        // 'x' is the 9th character; the two-byte 'é' puts it at byte 9.
        assert_eq!(idx.line_col(9), (1, 9));
        // A 4-byte char then a tab: 'y' sits at column 1 + 1 + 4.
        assert_eq!(idx.line_col(16), (2, 6));
    }
}
