//! Source positions and the per-file line index
//!
//! The lexer records the byte offset at which every line starts while it scans;
//! the parser and checker later turn token offsets back into 1-based
//! line/column pairs through [`SourceFile::position_for`].
//!
//! A [`SourceFile`] may be shared between the lexer and whoever resolves
//! positions, so the line table sits behind a single mutex.

use parking_lot::Mutex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A resolved source position.
///
/// `offset` is 0-based, `line` and `column` are 1-based. A line of `0` marks
/// the sentinel returned by [`Position::unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub filename: Arc<str>,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(filename: Arc<str>, offset: usize, line: usize, column: usize) -> Self {
        Self {
            filename,
            offset,
            line,
            column,
        }
    }

    /// Sentinel for diagnostics that have no single source location.
    pub fn unknown() -> Self {
        Self {
            filename: Arc::from(""),
            offset: 0,
            line: 0,
            column: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
            .then(self.offset.cmp(&other.offset))
            .then_with(|| self.filename.cmp(&other.filename))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "({}, {})", self.line, self.column)
        } else {
            write!(f, "(unknown)")
        }
    }
}

/// One source file: its name, its size and the offsets of its line starts.
#[derive(Debug)]
pub struct SourceFile {
    name: Arc<str>,
    size: usize,
    lines: Mutex<Vec<usize>>,
}

impl SourceFile {
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            name: Arc::from(name),
            size,
            // Line 1 always starts at offset 0.
            lines: Mutex::new(vec![0]),
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Record the start offset of a new line.
    ///
    /// The offset must be larger than the previous line start and smaller than
    /// the file size; anything else is ignored.
    pub fn add_line(&self, offset: usize) {
        let mut lines = self.lines.lock();
        let after_last = lines.last().map_or(true, |&last| last < offset);
        if after_last && offset < self.size {
            lines.push(offset);
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.lock().len()
    }

    /// Resolve a byte offset against the recorded line starts.
    pub fn position_for(&self, offset: usize) -> Position {
        let lines = self.lines.lock();
        // Number of line starts <= offset; always >= 1 because of the leading 0.
        let idx = lines.partition_point(|&start| start <= offset).max(1);
        let line_start = lines[idx - 1];

        Position {
            filename: Arc::clone(&self.name),
            offset,
            line: idx,
            column: offset - line_start + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_without_newlines() {
        let file = SourceFile::new("a.c", 10);
        let pos = file.position_for(4);
        assert_eq!((pos.line, pos.column), (1, 5));
        assert_eq!(&*pos.filename, "a.c");
    }

    #[test]
    fn test_line_starts_resolve_to_column_one() {
        let file = SourceFile::new("a.c", 30);
        file.add_line(6);
        file.add_line(14);

        assert_eq!((file.position_for(6).line, file.position_for(6).column), (2, 1));
        assert_eq!((file.position_for(13).line, file.position_for(13).column), (2, 8));
        assert_eq!((file.position_for(14).line, file.position_for(14).column), (3, 1));
        assert_eq!(file.position_for(29).line, 3);
    }

    #[test]
    fn test_add_line_ignores_stale_and_out_of_range_offsets() {
        let file = SourceFile::new("a.c", 20);
        file.add_line(5);
        file.add_line(5);
        file.add_line(3);
        file.add_line(20);
        file.add_line(42);
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_position_ordering_is_line_then_column() {
        let name: Arc<str> = Arc::from("a.c");
        let early = Position::new(Arc::clone(&name), 30, 2, 9);
        let late = Position::new(Arc::clone(&name), 31, 3, 1);
        let same_line = Position::new(name, 25, 2, 4);
        assert!(early < late);
        assert!(same_line < early);
    }

    #[test]
    fn test_display() {
        let pos = Position::new(Arc::from("a.c"), 0, 3, 7);
        assert_eq!(pos.to_string(), "(3, 7)");
        assert_eq!(Position::unknown().to_string(), "(unknown)");
    }
}
