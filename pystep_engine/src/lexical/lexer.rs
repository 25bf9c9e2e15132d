//! Maximal-munch tokenizer
//!
//! The scan is resumable: `step` consumes exactly one token from the
//! remaining input, so a driver can replay the pass match by match. A
//! character no pattern accepts becomes a single-character `UNKNOWN`
//! token; lexical gaps are data, never errors.

use crate::config::constants::compile_time;
use crate::lexical::patterns::patterns;
use crate::logging::codes;
use crate::tokens::{SymbolTable, Token, TokenKind};
use crate::utils::Position;
use crate::{log_success, log_warning};

pub struct Lexer {
    source: String,
    /// Byte offset into `source`
    iter: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    table: SymbolTable,
}

impl Lexer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            iter: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            table: SymbolTable::new(),
        }
    }

    /// Discard all progress and start the scan over.
    pub fn reset(&mut self) {
        self.iter = 0;
        self.line = 1;
        self.column = 1;
        self.tokens.clear();
        self.table = SymbolTable::new();
    }

    /// Whether the whole input has been consumed.
    pub fn is_done(&self) -> bool {
        self.iter >= self.source.len()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    /// Consume one token. Returns `false` once the input is exhausted; the
    /// terminating EOF token (lexeme `$`) is synthesized exactly once no
    /// matter how many further calls are made.
    pub fn step(&mut self) -> bool {
        if self.is_done() {
            self.push_eof_if_missing();
            return false;
        }

        let (kind, lexeme) = match self.longest_match() {
            Some((kind, lexeme)) => (kind, lexeme),
            None => {
                self.consume_unknown();
                if self.is_done() {
                    self.push_eof_if_missing();
                }
                return true;
            }
        };

        let mut token = Token::new(kind, lexeme.as_str(), self.line, self.column);
        if kind.is_symbol_entry() {
            token.entry = Some(self.table.len());
            self.table.push(token.clone());
        }

        let next = Position::new(self.line, self.column).advance_str(&lexeme);
        self.line = next.line;
        self.column = next.column;
        self.iter += lexeme.len();

        self.push_token(token);

        if self.is_done() {
            self.push_eof_if_missing();
        }
        true
    }

    /// Consume tokens up to (not including) the next newline, or to the
    /// end of input.
    pub fn skip_to_line_end(&mut self) {
        loop {
            self.step();
            if self.is_done() || self.source[self.iter..].starts_with('\n') {
                break;
            }
        }
    }

    /// Complete the scan.
    pub fn run_to_end(&mut self) {
        while self.step() {}
        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "tokenization complete",
            "tokens" => self.tokens.len(),
            "symbols" => self.table.len()
        );
    }

    pub fn into_parts(self) -> (Vec<Token>, SymbolTable) {
        (self.tokens, self.table)
    }

    /// Longest match over the pattern table; a length tie keeps the
    /// earlier entry.
    fn longest_match(&self) -> Option<(TokenKind, String)> {
        let slice = &self.source[self.iter..];
        let mut best: Option<(TokenKind, &str)> = None;
        for pattern in patterns() {
            if let Some(found) = pattern.re.find(slice) {
                let lexeme = found.as_str();
                if best.map_or(true, |(_, current)| lexeme.len() > current.len()) {
                    best = Some((pattern.kind, lexeme));
                }
            }
        }
        best.map(|(kind, lexeme)| (kind, lexeme.to_string()))
    }

    fn consume_unknown(&mut self) {
        let ch = match self.source[self.iter..].chars().next() {
            Some(ch) => ch,
            None => return,
        };

        log_warning!("no pattern matches input character",
            "char" => ch,
            "line" => self.line,
            "column" => self.column
        );

        let token = Token::new(TokenKind::Unknown, ch.to_string(), self.line, self.column);
        self.iter += ch.len_utf8();
        self.column += 1;
        self.push_token(token);
    }

    fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
        if self.tokens.len() == compile_time::lexical::MAX_TOKEN_COUNT {
            log_warning!("token limit reached",
                "limit" => compile_time::lexical::MAX_TOKEN_COUNT
            );
        }
    }

    fn push_eof_if_missing(&mut self) {
        if self.tokens.last().map_or(true, |t| !t.is_eof()) {
            self.tokens.push(Token::eof(self.line, self.column));
        }
    }
}

/// Scan a complete source text.
pub fn tokenize(source: &str) -> (Vec<Token>, SymbolTable) {
    let mut lexer = Lexer::new(source);
    lexer.run_to_end();
    lexer.into_parts()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_assignment() {
        let (tokens, table) = tokenize("x = 1\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Assignment,
                TokenKind::Whitespace,
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        // x and 1 are recorded, each token pointing at its own entry
        assert_eq!(table.len(), 2);
        assert_eq!(tokens[0].entry, Some(0));
        assert_eq!(tokens[4].entry, Some(1));
    }

    #[test]
    fn test_maximal_munch_prefers_longer_match() {
        // "iffy" begins with the reserved word "if" but the identifier
        // match is longer
        let (tokens, _) = tokenize("iffy");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "iffy");

        // ">=" over ">"
        let (tokens, _) = tokenize(">=");
        assert_eq!(tokens[0].kind, TokenKind::Comparator);
        assert_eq!(tokens[0].lexeme, ">=");

        // "//=" is a single assignment token, not operator plus "="
        let (tokens, _) = tokenize("//=");
        assert_eq!(tokens[0].kind, TokenKind::Assignment);
        assert_eq!(tokens[0].lexeme, "//=");
    }

    #[test]
    fn test_tie_break_keeps_earlier_pattern() {
        // "if" matches RESERVED and IDENTIFIER at the same length
        let (tokens, _) = tokenize("if");
        assert_eq!(tokens[0].kind, TokenKind::Reserved);

        // "42" matches INT and FLOAT at the same length
        let (tokens, _) = tokenize("42");
        assert_eq!(tokens[0].kind, TokenKind::Int);

        // a fractional part makes the FLOAT match longer
        let (tokens, _) = tokenize("4.25");
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[0].lexeme, "4.25");
    }

    #[test]
    fn test_unknown_character_is_a_token_not_an_error() {
        let (tokens, _) = tokenize("x ? y");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Unknown,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].lexeme, "?");
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        lexer.run_to_end();
        let before = lexer.tokens().len();
        assert!(!lexer.step());
        assert!(!lexer.step());
        assert_eq!(lexer.tokens().len(), before);
        assert_eq!(
            lexer.tokens().iter().filter(|t| t.is_eof()).count(),
            1
        );
    }

    #[test]
    fn test_empty_input_yields_lone_eof() {
        let (tokens, table) = tokenize("");
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_lexeme_round_trip() {
        let source = "def f(a, b):\n    # sum\n    return a + b\n";
        let (tokens, _) = tokenize(source);
        let rebuilt: String = tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let (tokens, _) = tokenize("x = 1\ny = 2\n");
        let y = tokens.iter().find(|t| t.lexeme == "y").unwrap();
        assert_eq!((y.line, y.column), (2, 1));
        let two = tokens.iter().find(|t| t.lexeme == "2").unwrap();
        assert_eq!((two.line, two.column), (2, 5));
    }

    #[test]
    fn test_multi_line_string_recomputes_column() {
        let (tokens, _) = tokenize("s = 'a\nbc' + t");
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.lexeme, "'a\nbc'");
        // the token after the string sits on line 2 past the closing quote
        let plus = tokens.iter().find(|t| t.lexeme == "+").unwrap();
        assert_eq!((plus.line, plus.column), (2, 5));
    }

    #[test]
    fn test_comment_runs_to_line_end() {
        let (tokens, _) = tokenize("# hello: world\nx");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].lexeme, "# hello: world");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
    }

    #[test]
    fn test_skip_to_line_end_stops_before_newline() {
        let mut lexer = Lexer::new("x = 1\ny = 2\n");
        lexer.skip_to_line_end();
        // everything on the first line is consumed, the newline is not
        assert_eq!(lexer.tokens().last().map(|t| t.lexeme.as_str()), Some("1"));
        assert!(lexer.step());
        assert_eq!(
            lexer.tokens().last().map(|t| t.kind),
            Some(TokenKind::Newline)
        );
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut lexer = Lexer::new("x = 1\n");
        lexer.run_to_end();
        assert!(!lexer.tokens().is_empty());

        lexer.reset();
        assert!(lexer.tokens().is_empty());
        assert!(lexer.symbol_table().is_empty());
        assert!(lexer.step());
    }
}
