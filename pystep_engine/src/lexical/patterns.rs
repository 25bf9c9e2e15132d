//! Tokenizer pattern table
//!
//! Patterns are anchored at the start of the remaining input and listed in
//! fixed priority order. The tokenizer selects the longest match; on a
//! length tie the earlier entry wins, which is what makes `if` a reserved
//! word while `iffy` stays an identifier.

use crate::tokens::TokenKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved words of the language.
pub const RESERVED_WORDS: [&str; 12] = [
    "if", "elif", "else", "in", "is", "while", "for", "pass", "break", "continue", "def", "return",
];

/// One entry of the pattern table.
pub struct Pattern {
    pub kind: TokenKind,
    pub re: Regex,
}

static PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    let reserved = RESERVED_WORDS.join("|");
    let table: Vec<(TokenKind, String)> = vec![
        (TokenKind::Newline, r"^\n".into()),
        (TokenKind::Whitespace, r"^( |\t)+".into()),
        (TokenKind::Comment, r"^(#.*)".into()),
        (TokenKind::Reserved, format!("^({reserved})")),
        (TokenKind::None, r"^None".into()),
        (TokenKind::Boolean, r"^(True|False)".into()),
        (TokenKind::Int, r"^([0-9]+)".into()),
        (
            TokenKind::Float,
            r"^([0-9]+)(\.[0-9]+)?((e|E)(\+|-)?([0-9]+))?".into(),
        ),
        (
            TokenKind::String,
            r#"^(("(\\.|[^"\\])*")|('(\\.|[^'\\])*'))"#.into(),
        ),
        (TokenKind::Operator, r"^(\+|-|\*|//|/|%|and|or)".into()),
        (TokenKind::Bitwise, r"^(<<|>>|&|\||\^)".into()),
        (TokenKind::Comparator, r"^(<=|>=|<|>|==|!=)".into()),
        (TokenKind::Identifier, r"^([a-zA-Z_][a-zA-Z0-9_]*)".into()),
        (
            TokenKind::Assignment,
            r"^(=|\+=|-=|\*=|//=|/=|%=|<<=|>>=|&=|\|=|\^=)".into(),
        ),
        (
            TokenKind::Punctuation,
            r"^(\(|\)|\[|\]|\{|\}|,|:|;|\.|@)".into(),
        ),
    ];

    table
        .into_iter()
        .map(|(kind, source)| Pattern {
            kind,
            // The pattern sources are fixed at compile time; a failure to
            // compile one is a build defect, not an input condition.
            re: Regex::new(&source)
                .unwrap_or_else(|e| panic!("invalid pattern for {}: {e}", kind.as_str())),
        })
        .collect()
});

/// The pattern table in priority order.
pub fn patterns() -> &'static [Pattern] {
    &PATTERNS
}
