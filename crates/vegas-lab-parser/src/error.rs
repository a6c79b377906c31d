use std::fmt;
use thiserror::Error;

/// 1-based line/column location within the log text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Locate a byte offset within `text`.
    pub fn locate(text: &str, offset: usize) -> Self {
        let head = &text[..offset.min(text.len())];
        let line = head.bytes().filter(|b| *b == b'\n').count() + 1;
        let column = head.rfind('\n').map_or(offset + 1, |nl| offset - nl);
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    /// A span triggered the record template but then deviated from the rule
    /// sequence (wrong literal label, missing field, unexpected line break).
    #[error("malformed record at {position}: expected {expected}")]
    Template {
        position: Position,
        expected: &'static str,
    },

    /// A captured field failed strict numeric conversion.
    #[error("invalid value {value:?} for {field} at {position}")]
    Cast {
        field: &'static str,
        value: String,
        position: Position,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_based() {
        let text = "first\nsecond\nthird";
        assert_eq!(Position::locate(text, 0), Position { line: 1, column: 1 });
        assert_eq!(Position::locate(text, 6), Position { line: 2, column: 1 });
        assert_eq!(Position::locate(text, 8), Position { line: 2, column: 3 });
    }

    #[test]
    fn errors_render_location() {
        let err = ParseError::Template {
            position: Position { line: 4, column: 17 },
            expected: "FileSize",
        };
        assert_eq!(
            err.to_string(),
            "malformed record at line 4, column 17: expected FileSize"
        );
    }
}
