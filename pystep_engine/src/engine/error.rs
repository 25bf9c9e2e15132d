//! Syntax errors raised by the parse engine
//!
//! Only an unmet required expectation produces an error; unmet optional
//! expectations derive epsilon. A stack desynchronization is an engine
//! defect and panics instead of surfacing here.

use crate::logging::codes::{self, Code};
use crate::tokens::Token;
use crate::utils::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected {expected} but got {found:?} at {position} (while deriving {symbol})")]
    UnexpectedToken {
        /// Grammar symbol whose expectation went unmet
        symbol: &'static str,
        /// Expected category or pinned lexeme
        expected: String,
        /// Lexeme actually found
        found: String,
        position: Position,
    },

    #[error("expected {symbol} but the input is exhausted at token {cursor}")]
    UnexpectedEndOfInput { symbol: &'static str, cursor: usize },

    #[error("maximum derivation depth exceeded ({depth}) at token {cursor}")]
    DerivationTooDeep { depth: usize, cursor: usize },
}

impl SyntaxError {
    pub fn unexpected_token(
        symbol: &'static str,
        expected: impl Into<String>,
        found: &Token,
    ) -> Self {
        Self::UnexpectedToken {
            symbol,
            expected: expected.into(),
            found: found.lexeme.clone(),
            position: found.position(),
        }
    }

    /// Dispatch failure: the lookahead selects no production of `symbol`.
    pub fn unexpected_symbol(symbol: &'static str, found: &Token) -> Self {
        Self::unexpected_token(symbol, symbol, found)
    }

    pub fn unexpected_end_of_input(symbol: &'static str, cursor: usize) -> Self {
        Self::UnexpectedEndOfInput { symbol, cursor }
    }

    pub fn derivation_too_deep(depth: usize, cursor: usize) -> Self {
        Self::DerivationTooDeep { depth, cursor }
    }

    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            SyntaxError::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            SyntaxError::DerivationTooDeep { .. } => codes::syntax::MAX_DERIVATION_DEPTH,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            SyntaxError::UnexpectedToken { position, .. } => Some(*position),
            SyntaxError::UnexpectedEndOfInput { .. } => None,
            SyntaxError::DerivationTooDeep { .. } => None,
        }
    }
}
