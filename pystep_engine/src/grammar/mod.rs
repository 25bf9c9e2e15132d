//! Grammar symbols and the syntax tree

pub mod node;
pub mod symbol;

pub use node::{Node, NodeAttrs};
pub use symbol::{GrammarSymbol, NonTerminal, SymbolKind};
