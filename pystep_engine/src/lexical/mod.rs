//! Lexical analysis
//!
//! A fixed-priority pattern table drives a maximal-munch tokenizer. The
//! tokenizer is steppable: each [`Lexer::step`] emits exactly one token,
//! so external drivers can observe the scan one match at a time.

pub mod lexer;
pub mod patterns;

pub use lexer::{tokenize, Lexer};
pub use patterns::{patterns, Pattern, RESERVED_WORDS};
