//! Grammar stack symbols
//!
//! The parse stack holds constructed symbols rather than encoded strings:
//! a symbol is a terminal category or a non-terminal, an optional pinned
//! literal, and an optionality flag. `Display` renders the conventional
//! textual form (`punctuation:(`, `whitespace?`, `STATEMENT`) for
//! observers.

use crate::tokens::TokenKind;
use serde::Serialize;
use std::fmt;

/// The non-terminals of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NonTerminal {
    Start,
    Block,
    Statement,
    Simple,
    Compound,
    If,
    Elif,
    Else,
    While,
    For,
    Function,
    Args,
    ArgsPrime,
    FunctionCall,
    Params,
    ParamsPrime,
    Expression,
    ExpressionPrime,
    Comparison,
    ComparisonPrime,
    Bitwise,
    BitwisePrime,
    Operand,
    OperandPrime,
    Term,
    TermPrime,
    Factor,
}

impl NonTerminal {
    pub fn name(&self) -> &'static str {
        match self {
            NonTerminal::Start => "START",
            NonTerminal::Block => "BLOCK",
            NonTerminal::Statement => "STATEMENT",
            NonTerminal::Simple => "SIMPLE",
            NonTerminal::Compound => "COMPOUND",
            NonTerminal::If => "IF",
            NonTerminal::Elif => "ELIF",
            NonTerminal::Else => "ELSE",
            NonTerminal::While => "WHILE",
            NonTerminal::For => "FOR",
            NonTerminal::Function => "FUNCTION",
            NonTerminal::Args => "ARGS",
            NonTerminal::ArgsPrime => "ARGS_PRIME",
            NonTerminal::FunctionCall => "FUNCTION_CALL",
            NonTerminal::Params => "PARAMS",
            NonTerminal::ParamsPrime => "PARAMS_PRIME",
            NonTerminal::Expression => "EXPRESSION",
            NonTerminal::ExpressionPrime => "EXPRESSION_PRIME",
            NonTerminal::Comparison => "COMPARISON",
            NonTerminal::ComparisonPrime => "COMPARISON_PRIME",
            NonTerminal::Bitwise => "BITWISE",
            NonTerminal::BitwisePrime => "BITWISE_PRIME",
            NonTerminal::Operand => "OPERAND",
            NonTerminal::OperandPrime => "OPERAND_PRIME",
            NonTerminal::Term => "TERM",
            NonTerminal::TermPrime => "TERM_PRIME",
            NonTerminal::Factor => "FACTOR",
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a stack symbol expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Terminal(TokenKind),
    NonTerminal(NonTerminal),
}

/// One entry of the parse stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrammarSymbol {
    pub kind: SymbolKind,
    /// Pinned lexeme for terminals that must match a specific spelling
    pub literal: Option<&'static str>,
    /// An unmet optional expectation is epsilon, not an error
    pub optional: bool,
}

impl GrammarSymbol {
    pub const fn terminal(kind: TokenKind) -> Self {
        Self {
            kind: SymbolKind::Terminal(kind),
            literal: None,
            optional: false,
        }
    }

    pub const fn optional_terminal(kind: TokenKind) -> Self {
        Self {
            kind: SymbolKind::Terminal(kind),
            literal: None,
            optional: true,
        }
    }

    pub const fn literal(kind: TokenKind, lexeme: &'static str) -> Self {
        Self {
            kind: SymbolKind::Terminal(kind),
            literal: Some(lexeme),
            optional: false,
        }
    }

    pub const fn nonterminal(nt: NonTerminal) -> Self {
        Self {
            kind: SymbolKind::NonTerminal(nt),
            literal: None,
            optional: false,
        }
    }

    pub const fn optional_nonterminal(nt: NonTerminal) -> Self {
        Self {
            kind: SymbolKind::NonTerminal(nt),
            literal: None,
            optional: true,
        }
    }

    /// Name used in diagnostics: lowercase for terminals, uppercase for
    /// non-terminals.
    pub fn name(&self) -> &'static str {
        match self.kind {
            SymbolKind::Terminal(kind) => kind.stack_name(),
            SymbolKind::NonTerminal(nt) => nt.name(),
        }
    }

    pub fn is_nonterminal(&self, nt: NonTerminal) -> bool {
        self.kind == SymbolKind::NonTerminal(nt)
    }
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(literal) = self.literal {
            write!(f, ":{literal}")?;
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(
            GrammarSymbol::terminal(TokenKind::Newline).to_string(),
            "newline"
        );
        assert_eq!(
            GrammarSymbol::optional_terminal(TokenKind::Whitespace).to_string(),
            "whitespace?"
        );
        assert_eq!(
            GrammarSymbol::literal(TokenKind::Punctuation, ":").to_string(),
            "punctuation::"
        );
        assert_eq!(
            GrammarSymbol::nonterminal(NonTerminal::Statement).to_string(),
            "STATEMENT"
        );
        assert_eq!(
            GrammarSymbol::optional_nonterminal(NonTerminal::Start).to_string(),
            "START?"
        );
    }

    #[test]
    fn test_optionality_is_part_of_identity() {
        let required = GrammarSymbol::nonterminal(NonTerminal::Block);
        let optional = GrammarSymbol::optional_nonterminal(NonTerminal::Block);
        assert_ne!(required, optional);
        assert!(required.is_nonterminal(NonTerminal::Block));
        assert!(optional.is_nonterminal(NonTerminal::Block));
    }
}
