// Internal modules
pub mod config;
pub mod controller;
pub mod engine;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use controller::{Snapshot, StepController};
pub use engine::{Session, Status, SyntaxError};
pub use lexical::{tokenize, Lexer};
pub use tokens::{SymbolTable, Token, TokenKind};
