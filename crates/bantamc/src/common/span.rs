//! Source locations

use std::fmt;

/// Byte range in a source file, plus the line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start` (0 for synthetic nodes)
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Span for nodes that have no source text (built-in class members)
    pub fn synthetic() -> Self {
        Self::default()
    }

    /// Smallest span covering both, keeping the line of the earlier one
    pub fn merge(self, other: Span) -> Span {
        let line = if self.start <= other.start { self.line } else { other.line };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_earlier_line() {
        let a = Span::new(10, 14, 2);
        let b = Span::new(30, 31, 4);
        assert_eq!(a.merge(b), Span::new(10, 31, 2));
        assert_eq!(b.merge(a), Span::new(10, 31, 2));
    }
}
