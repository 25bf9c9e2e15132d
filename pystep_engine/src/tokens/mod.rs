//! Token model and symbol table

pub mod table;
pub mod token;

pub use table::SymbolTable;
pub use token::{Token, TokenKind};
