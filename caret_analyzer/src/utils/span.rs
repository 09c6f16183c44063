//! Source location tracking for expression text
//!
//! The analyzer itself works on byte offsets. Line and column information is
//! only computed when a position has to be shown to a person, e.g. in a log
//! line or a CLI diagnostic.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, counted in characters)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Resolve a byte offset within `text`.
    ///
    /// Offsets past the end clamp to the end; offsets inside a multi-byte
    /// character resolve to that character.
    pub fn locate(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let mut line = 1u32;
        let mut column = 1u32;

        for (index, ch) in text.char_indices() {
            if index >= offset {
                break;
            }
            if index + ch.len_utf8() > offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self::new(offset, line, column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Build a span over `text[start..end]`, computing lines and columns
    pub fn from_offsets(text: &str, start: usize, end: usize) -> Self {
        let start_pos = Position::locate(text, start);
        let end_pos = Position::locate(text, end.max(start));
        Self::new(start_pos, end_pos)
    }

    /// Zero-width span at `offset` (error positions, caret positions)
    pub fn point(text: &str, offset: usize) -> Self {
        let pos = Position::locate(text, offset);
        Self::new(pos, pos)
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Text covered by this span, or `None` if the span does not fit `input`
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Renders diagnostics against a piece of source text
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&'a str> {
        if line_num == 0 {
            return None;
        }
        self.source.lines().nth((line_num - 1) as usize)
    }

    /// Format an error message with the offending line and a marker under the position
    pub fn format_error(&self, offset: usize, message: &str) -> String {
        let pos = Position::locate(self.source, offset);
        let mut result = format!("Error: {}\n  --> {}\n", message, pos);

        let line = self.get_line(pos.line).unwrap_or("");
        let line_num_str = pos.line.to_string();
        let padding = " ".repeat(line_num_str.len());

        result.push_str(&format!("   {} |\n", padding));
        result.push_str(&format!("{} | {}\n", line_num_str, line));
        result.push_str(&format!(
            "   {} | {}^\n",
            padding,
            " ".repeat(pos.column.saturating_sub(1) as usize)
        ));

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_tracks_lines_and_columns() {
        let text = "it.Name\n  + x";
        assert_eq!(Position::locate(text, 0), Position::new(0, 1, 1));
        assert_eq!(Position::locate(text, 3), Position::new(3, 1, 4));
        assert_eq!(Position::locate(text, 10), Position::new(10, 2, 3));
    }

    #[test]
    fn test_locate_counts_characters_not_bytes() {
        let text = "\"é\".Length";
        // 'é' is two bytes; the '.' sits at byte 4 but column 4
        assert_eq!(Position::locate(text, 4).column, 4);
    }

    #[test]
    fn test_locate_clamps_past_end() {
        assert_eq!(Position::locate("abc", 99).offset, 3);
    }

    #[test]
    fn test_span_from_offsets() {
        let text = "it.Name + 1";
        let span = Span::from_offsets(text, 3, 7);
        assert_eq!(span.len(), 4);
        assert_eq!(span.slice(text), Some("Name"));
        assert_eq!(span.to_string(), "1:4-8");
        assert!(Span::point(text, 5).is_empty());
    }

    #[test]
    fn test_format_error_marks_column() {
        let map = SourceMap::new("a + #");
        let rendered = map.format_error(4, "Syntax error '#'");
        assert!(rendered.contains("--> 1:5"));
        assert!(rendered.contains("1 | a + #"));
        assert!(rendered.ends_with("    ^\n"));
    }
}
