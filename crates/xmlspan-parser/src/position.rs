//! Byte offset to line/column translation.
//!
//! Built once per source with a single scan for line breaks and tabs; every
//! lookup afterwards is two binary searches.

use memchr::memchr_iter;
use xmlspan_ast::{Position, SourceLocation, Span};

use crate::options::TabWidth;

/// Precomputed line-break and tab offsets for one source text.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    /// Offsets of every `\n`. Line `n` (1-based) starts one byte after
    /// `line_breaks[n - 2]`; the first line starts at the implicit sentinel
    /// before offset 0.
    line_breaks: Vec<usize>,
    /// Offsets of every `\t`.
    tabs: Vec<usize>,
    tab_width: TabWidth,
    len: usize,
}

impl PositionIndex {
    /// Scan `source` once for line breaks and tabs.
    #[must_use]
    pub fn build(source: &str, tab_width: TabWidth) -> Self {
        let bytes = source.as_bytes();
        Self {
            line_breaks: memchr_iter(b'\n', bytes).collect(),
            tabs: memchr_iter(b'\t', bytes).collect(),
            tab_width,
            len: source.len(),
        }
    }

    /// Length of the indexed source in bytes.
    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.len
    }

    /// Number of lines in the source.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }

    /// Line and column of `offset`.
    ///
    /// A `\n` belongs to the line it terminates. Offsets past the end of
    /// the source resolve on the last line.
    #[must_use]
    pub fn lookup(&self, offset: usize) -> Position {
        // Breaks strictly before `offset`; the first break at or after it
        // terminates the line we are on.
        let breaks_before = self.line_breaks.partition_point(|&b| b < offset);
        let line_start = match breaks_before {
            0 => 0,
            n => self.line_breaks[n - 1] + 1,
        };

        let tabs_from = self.tabs.partition_point(|&t| t < line_start);
        let tabs_to = self.tabs.partition_point(|&t| t < offset);
        let tab_count = tabs_to.saturating_sub(tabs_from);

        Position {
            line: breaks_before + 1,
            column: offset.saturating_sub(line_start) + tab_count * self.tab_width.extra_columns(),
        }
    }

    /// Start and end positions of a span.
    #[must_use]
    pub fn locate(&self, span: Span) -> SourceLocation {
        SourceLocation {
            start: self.lookup(span.start),
            end: self.lookup(span.end),
        }
    }
}
