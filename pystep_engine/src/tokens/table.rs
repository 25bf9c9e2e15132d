//! Symbol table for literal and reference tokens
//!
//! Every occurrence of a boolean, int, float, string, or identifier token
//! is appended in first-seen order. Occurrences are deliberately not
//! deduplicated: the table mirrors the token stream, and each token
//! records the index of its own entry.

use super::token::Token;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolTable {
    entries: Vec<Token>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an occurrence and return its entry index.
    pub fn push(&mut self, token: Token) -> usize {
        let index = self.entries.len();
        self.entries.push(token);
        index
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter()
    }
}
