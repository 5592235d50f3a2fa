//! Source location tracking.
//!
//! Every AST node has a `Span` indicating its position in the source code.
//! Errors carry a byte offset that is turned into a [`Location`] only when
//! it is reported.

use std::fmt;

/// A half-open byte range `[start, end)` in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub const fn empty(pos: u32) -> Self {
        Self { start: pos, end: pos }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub const fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start < other.start { self.start } else { other.start },
            end: if self.end > other.end { self.end } else { other.end },
        }
    }
}

/// A human-facing `(line, column)` pair.
///
/// Lines are 1-based. Columns count only the non-whitespace characters
/// between the last line break and the offset, so an offset sitting after
/// leading indentation still reports column 1 for the first visible
/// character of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Scan `source` from the start up to `offset`.
    pub fn locate(source: &str, offset: u32) -> Self {
        let mut line = 1;
        let mut column = 0;
        for (i, c) in source.char_indices() {
            if i as u32 >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 0;
            } else if !c.is_whitespace() {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(8, 15);
        assert_eq!(a.merge(b), Span::new(5, 15));
    }

    #[test]
    fn test_locate_counts_lines() {
        let source = "a;\nb;\nc;";
        assert_eq!(Location::locate(source, 0), Location { line: 1, column: 0 });
        assert_eq!(Location::locate(source, 3), Location { line: 2, column: 0 });
        assert_eq!(Location::locate(source, 7), Location { line: 3, column: 1 });
    }

    #[test]
    fn test_locate_skips_whitespace_in_column() {
        // "    foo = bar" with the offset on `bar`
        let source = "x;\n    foo = bar";
        let offset = source.find("bar").unwrap() as u32;
        let loc = Location::locate(source, offset);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 4);
    }
}
