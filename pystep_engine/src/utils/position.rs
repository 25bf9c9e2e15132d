//! Source location tracking
//!
//! Tokens and log events carry a line/column position so that observers
//! can point back into the source text. Both coordinates are 1-based.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The starting position (line 1, column 1)
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Advance the position past a lexeme, recomputing the column when the
    /// lexeme spans multiple lines.
    pub fn advance_str(self, lexeme: &str) -> Self {
        let mut lines = lexeme.split('\n');
        let first = lines.next().unwrap_or_default();
        let mut last = first;
        let mut extra_lines = 0u32;
        for segment in lines {
            extra_lines += 1;
            last = segment;
        }

        if extra_lines == 0 {
            Self {
                line: self.line,
                column: self.column + first.chars().count() as u32,
            }
        } else {
            Self {
                line: self.line + extra_lines,
                column: last.chars().count() as u32 + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
