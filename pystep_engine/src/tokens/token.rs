//! Token and token category definitions

use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token categories produced by the tokenizer.
///
/// The set is closed: every category corresponds to one entry in the
/// pattern table, plus `Unknown` for unmatched input and `Eof` for the
/// synthesized end-of-input marker. Serialized names use the uppercase
/// interop form (`NEWLINE`, `WHITESPACE`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Newline,
    Whitespace,
    Comment,
    Reserved,
    None,
    Boolean,
    Int,
    Float,
    String,
    Operator,
    Bitwise,
    Comparator,
    Identifier,
    Assignment,
    Punctuation,
    Unknown,
    Eof,
}

impl TokenKind {
    /// Uppercase interop name
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Newline => "NEWLINE",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Reserved => "RESERVED",
            TokenKind::None => "NONE",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Bitwise => "BITWISE",
            TokenKind::Comparator => "COMPARATOR",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Assignment => "ASSIGNMENT",
            TokenKind::Punctuation => "PUNCTUATION",
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Eof => "EOF",
        }
    }

    /// Lowercase name used on the grammar stack and as leaf node names
    pub fn stack_name(&self) -> &'static str {
        match self {
            TokenKind::Newline => "newline",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Reserved => "reserved",
            TokenKind::None => "none",
            TokenKind::Boolean => "boolean",
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Operator => "operator",
            TokenKind::Bitwise => "bitwise",
            TokenKind::Comparator => "comparator",
            TokenKind::Identifier => "identifier",
            TokenKind::Assignment => "assignment",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Unknown => "unknown",
            TokenKind::Eof => "eof",
        }
    }

    /// Categories whose occurrences are recorded in the symbol table
    pub fn is_symbol_entry(&self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::Identifier
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single token. Immutable once produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token category
    pub kind: TokenKind,
    /// Matched source text (`$` for the synthesized EOF token)
    pub lexeme: String,
    /// Line of the first character (1-based)
    pub line: u32,
    /// Column of the first character (1-based)
    pub column: u32,
    /// Symbol table entry index, for literal and reference tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
            entry: None,
        }
    }

    /// The synthesized end-of-input token
    pub fn eof(line: u32, column: u32) -> Self {
        Self::new(TokenKind::Eof, "$", line, column)
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) @{}:{}",
            self.kind.as_str(),
            self.lexeme,
            self.line,
            self.column
        )
    }
}
