//! Non-terminal expansion
//!
//! Each non-terminal inspects the lookahead, picks exactly one production
//! (or epsilon), records its node in the tree, and pushes the production
//! onto the stack and the continuation. Which of the two happens first
//! differs per non-terminal: structural heads record their node before
//! dispatching, while tail and list non-terminals only materialize a node
//! once the lookahead commits to them.

use super::error::SyntaxError;
use super::session::{Frame, Session};
use crate::config::constants::compile_time::syntax::{INDENT_STEP, MAX_STACK_DEPTH};
use crate::grammar::{GrammarSymbol, Node, NodeAttrs, NonTerminal};
use crate::log_debug;
use crate::tokens::TokenKind;

/// Outcome of an expansion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Expansion {
    /// A production was pushed; the derivation suspends here.
    Suspended,
    /// The non-terminal derived epsilon without a node; the derivation
    /// folds the next action into the same step.
    Epsilon,
}

const fn t(kind: TokenKind) -> GrammarSymbol {
    GrammarSymbol::terminal(kind)
}

const fn t_opt(kind: TokenKind) -> GrammarSymbol {
    GrammarSymbol::optional_terminal(kind)
}

const fn lit(kind: TokenKind, lexeme: &'static str) -> GrammarSymbol {
    GrammarSymbol::literal(kind, lexeme)
}

const fn nt(nt: NonTerminal) -> GrammarSymbol {
    GrammarSymbol::nonterminal(nt)
}

const fn nt_opt(nt: NonTerminal) -> GrammarSymbol {
    GrammarSymbol::optional_nonterminal(nt)
}

const WS_OPT: GrammarSymbol = t_opt(TokenKind::Whitespace);
const COMMENT_OPT: GrammarSymbol = t_opt(TokenKind::Comment);
const NEWLINE: GrammarSymbol = t(TokenKind::Newline);
const COLON: GrammarSymbol = lit(TokenKind::Punctuation, ":");

/// Pin a dynamic lexeme to its static spelling so productions can carry
/// `&'static str` literals.
fn pin(lexeme: &str) -> Option<&'static str> {
    const SPELLINGS: &[&str] = &[
        "pass", "break", "continue", "and", "or", "+", "-", "*", "//", "/", "%", "<=", ">=", "<",
        ">", "==", "!=", "<<", ">>", "&", "|", "^",
    ];
    SPELLINGS.iter().copied().find(|&s| s == lexeme)
}

impl Session {
    /// Expand `target` against the current lookahead.
    ///
    /// `required` distinguishes a mandatory occurrence from an optional
    /// one: an optional non-terminal whose dispatch finds no viable
    /// production derives epsilon, a required one raises a syntax error.
    /// `parent` is the tree path of the node the expansion attaches
    /// under; `None` only for the start symbol.
    pub(super) fn expand(
        &mut self,
        target: NonTerminal,
        required: bool,
        parent: Option<Vec<usize>>,
    ) -> Result<Expansion, SyntaxError> {
        let kind = self.lookahead().kind;
        let lexeme = self.lookahead().lexeme.clone();

        match target {
            NonTerminal::Start => {
                if kind == TokenKind::Eof {
                    if required {
                        return Err(SyntaxError::unexpected_end_of_input("START", self.cursor));
                    }
                    return Ok(Expansion::Epsilon);
                }
                let indent = self.indent_of(&parent);
                let path = self.attach_under(&parent, Node::new("START", NodeAttrs::indent(indent)));
                self.activate(
                    target,
                    path,
                    vec![nt(NonTerminal::Statement), nt_opt(NonTerminal::Start)],
                )
            }

            NonTerminal::Block => {
                let threshold = self.indent_of(&parent);
                let gated = kind == TokenKind::Whitespace && lexeme.chars().count() >= threshold;
                if !gated {
                    // a dedent (or end of input) closes the block even when
                    // the grammar position demands one
                    return Ok(Expansion::Epsilon);
                }
                let path =
                    self.attach_under(&parent, Node::new("BLOCK", NodeAttrs::indent(threshold)));
                self.activate(
                    target,
                    path,
                    vec![
                        t(TokenKind::Whitespace),
                        nt(NonTerminal::Statement),
                        nt_opt(NonTerminal::Block),
                    ],
                )
            }

            NonTerminal::Statement => {
                let indent = self.indent_of(&parent);
                let path =
                    self.attach_under(&parent, Node::new("STATEMENT", NodeAttrs::indent(indent)));
                let production = if kind == TokenKind::Newline {
                    vec![NEWLINE]
                } else if kind == TokenKind::Reserved
                    && matches!(lexeme.as_str(), "if" | "while" | "for" | "def")
                {
                    vec![nt(NonTerminal::Compound)]
                } else {
                    vec![nt(NonTerminal::Simple), WS_OPT, COMMENT_OPT, NEWLINE]
                };
                self.activate(target, path, production)
            }

            NonTerminal::Simple => {
                let path = self.attach_under(&parent, Node::new("SIMPLE", NodeAttrs::default()));
                let production = match kind {
                    TokenKind::Reserved if lexeme == "return" => vec![
                        lit(TokenKind::Reserved, "return"),
                        t(TokenKind::Whitespace),
                        nt(NonTerminal::Expression),
                    ],
                    TokenKind::Reserved
                        if matches!(lexeme.as_str(), "pass" | "break" | "continue") =>
                    {
                        match pin(&lexeme) {
                            Some(spelling) => vec![lit(TokenKind::Reserved, spelling)],
                            None => return self.dispatch_failure("SIMPLE", required),
                        }
                    }
                    TokenKind::Comment => vec![t(TokenKind::Comment)],
                    TokenKind::Whitespace => vec![t(TokenKind::Whitespace)],
                    TokenKind::Identifier if self.assignment_follows() => vec![
                        t(TokenKind::Identifier),
                        WS_OPT,
                        t(TokenKind::Assignment),
                        WS_OPT,
                        nt(NonTerminal::Expression),
                    ],
                    _ if self.starts_expression(kind, &lexeme) => {
                        vec![nt(NonTerminal::Expression)]
                    }
                    _ => return self.dispatch_failure("SIMPLE", required),
                };
                self.activate(target, path, production)
            }

            NonTerminal::Compound => {
                let indent = self.indent_of(&parent) + INDENT_STEP;
                let path =
                    self.attach_under(&parent, Node::new("COMPOUND", NodeAttrs::indent(indent)));
                let production = match lexeme.as_str() {
                    "if" => vec![nt(NonTerminal::If)],
                    "while" => vec![nt(NonTerminal::While)],
                    "for" => vec![nt(NonTerminal::For)],
                    "def" => vec![nt(NonTerminal::Function)],
                    _ => return self.dispatch_failure("COMPOUND", required),
                };
                self.activate(target, path, production)
            }

            NonTerminal::If => {
                let indent = self.indent_of(&parent);
                let path = self.attach_under(&parent, Node::new("IF", NodeAttrs::indent(indent)));
                self.activate(
                    target,
                    path,
                    vec![
                        lit(TokenKind::Reserved, "if"),
                        t(TokenKind::Whitespace),
                        nt(NonTerminal::Expression),
                        WS_OPT,
                        COLON,
                        WS_OPT,
                        COMMENT_OPT,
                        NEWLINE,
                        nt(NonTerminal::Block),
                        nt_opt(NonTerminal::Elif),
                    ],
                )
            }

            NonTerminal::Elif => {
                // the branch slot is recorded even when no elif/else follows
                let indent = self.indent_of(&parent);
                let path = self.attach_under(&parent, Node::new("ELIF", NodeAttrs::indent(indent)));
                let production = if self.lexeme_within_one("elif") {
                    vec![
                        WS_OPT,
                        lit(TokenKind::Reserved, "elif"),
                        t(TokenKind::Whitespace),
                        nt(NonTerminal::Expression),
                        WS_OPT,
                        COLON,
                        WS_OPT,
                        COMMENT_OPT,
                        NEWLINE,
                        nt(NonTerminal::Block),
                        nt_opt(NonTerminal::Elif),
                    ]
                } else {
                    vec![nt_opt(NonTerminal::Else)]
                };
                self.activate(target, path, production)
            }

            NonTerminal::Else => {
                if !self.lexeme_within_one("else") {
                    return self.dispatch_failure("ELSE", required);
                }
                let indent = self.indent_of(&parent);
                let path = self.attach_under(&parent, Node::new("ELSE", NodeAttrs::indent(indent)));
                self.activate(
                    target,
                    path,
                    vec![
                        WS_OPT,
                        lit(TokenKind::Reserved, "else"),
                        WS_OPT,
                        COLON,
                        WS_OPT,
                        COMMENT_OPT,
                        NEWLINE,
                        nt(NonTerminal::Block),
                    ],
                )
            }

            NonTerminal::While => {
                let indent = self.indent_of(&parent);
                let path =
                    self.attach_under(&parent, Node::new("WHILE", NodeAttrs::indent(indent)));
                self.activate(
                    target,
                    path,
                    vec![
                        lit(TokenKind::Reserved, "while"),
                        t(TokenKind::Whitespace),
                        nt(NonTerminal::Expression),
                        WS_OPT,
                        COLON,
                        WS_OPT,
                        COMMENT_OPT,
                        NEWLINE,
                        nt(NonTerminal::Block),
                        nt_opt(NonTerminal::Else),
                    ],
                )
            }

            NonTerminal::For => {
                let indent = self.indent_of(&parent);
                let path = self.attach_under(&parent, Node::new("FOR", NodeAttrs::indent(indent)));
                self.activate(
                    target,
                    path,
                    vec![
                        lit(TokenKind::Reserved, "for"),
                        t(TokenKind::Whitespace),
                        t(TokenKind::Identifier),
                        t(TokenKind::Whitespace),
                        lit(TokenKind::Reserved, "in"),
                        t(TokenKind::Whitespace),
                        nt(NonTerminal::Expression),
                        WS_OPT,
                        COLON,
                        WS_OPT,
                        COMMENT_OPT,
                        NEWLINE,
                        nt(NonTerminal::Block),
                        nt_opt(NonTerminal::Else),
                    ],
                )
            }

            NonTerminal::Function => {
                let indent = self.indent_of(&parent);
                let path =
                    self.attach_under(&parent, Node::new("FUNCTION", NodeAttrs::indent(indent)));
                self.activate(
                    target,
                    path,
                    vec![
                        lit(TokenKind::Reserved, "def"),
                        t(TokenKind::Whitespace),
                        t(TokenKind::Identifier),
                        WS_OPT,
                        lit(TokenKind::Punctuation, "("),
                        WS_OPT,
                        nt_opt(NonTerminal::Args),
                        WS_OPT,
                        lit(TokenKind::Punctuation, ")"),
                        WS_OPT,
                        COLON,
                        WS_OPT,
                        COMMENT_OPT,
                        NEWLINE,
                        nt(NonTerminal::Block),
                    ],
                )
            }

            NonTerminal::Args => {
                if kind != TokenKind::Identifier {
                    return self.dispatch_failure("ARGS", required);
                }
                let path = self.attach_under(&parent, Node::new("ARGS", NodeAttrs::default()));
                self.activate(
                    target,
                    path,
                    vec![t(TokenKind::Identifier), nt_opt(NonTerminal::ArgsPrime)],
                )
            }

            NonTerminal::ArgsPrime => {
                if !self.lexeme_within_one(",") {
                    return self.dispatch_failure("ARGS_PRIME", required);
                }
                let path =
                    self.attach_under(&parent, Node::new("ARGS_PRIME", NodeAttrs::default()));
                self.activate(
                    target,
                    path,
                    vec![
                        WS_OPT,
                        lit(TokenKind::Punctuation, ","),
                        WS_OPT,
                        t(TokenKind::Identifier),
                        nt_opt(NonTerminal::ArgsPrime),
                    ],
                )
            }

            NonTerminal::FunctionCall => {
                let path =
                    self.attach_under(&parent, Node::new("FUNCTION_CALL", NodeAttrs::default()));
                self.activate(
                    target,
                    path,
                    vec![
                        t(TokenKind::Identifier),
                        WS_OPT,
                        lit(TokenKind::Punctuation, "("),
                        WS_OPT,
                        nt_opt(NonTerminal::Params),
                        WS_OPT,
                        lit(TokenKind::Punctuation, ")"),
                    ],
                )
            }

            NonTerminal::Params => {
                if !self.starts_expression(kind, &lexeme) {
                    return self.dispatch_failure("PARAMS", required);
                }
                let path = self.attach_under(&parent, Node::new("PARAMS", NodeAttrs::default()));
                self.activate(
                    target,
                    path,
                    vec![nt(NonTerminal::Expression), nt_opt(NonTerminal::ParamsPrime)],
                )
            }

            NonTerminal::ParamsPrime => {
                if !self.lexeme_within_one(",") {
                    return self.dispatch_failure("PARAMS_PRIME", required);
                }
                let path =
                    self.attach_under(&parent, Node::new("PARAMS_PRIME", NodeAttrs::default()));
                self.activate(
                    target,
                    path,
                    vec![
                        WS_OPT,
                        lit(TokenKind::Punctuation, ","),
                        WS_OPT,
                        nt(NonTerminal::Expression),
                        nt_opt(NonTerminal::ParamsPrime),
                    ],
                )
            }

            NonTerminal::Expression => self.binary_head(
                parent,
                "EXPRESSION",
                NonTerminal::Expression,
                NonTerminal::Comparison,
                NonTerminal::ExpressionPrime,
            ),

            NonTerminal::ExpressionPrime => {
                if kind != TokenKind::Operator || !matches!(lexeme.as_str(), "and" | "or") {
                    return self.dispatch_failure("EXPRESSION_PRIME", required);
                }
                self.binary_tail(
                    parent,
                    "EXPRESSION_PRIME",
                    NonTerminal::ExpressionPrime,
                    TokenKind::Operator,
                    &lexeme,
                    NonTerminal::Comparison,
                    required,
                )
            }

            NonTerminal::Comparison => self.binary_head(
                parent,
                "COMPARISON",
                NonTerminal::Comparison,
                NonTerminal::Bitwise,
                NonTerminal::ComparisonPrime,
            ),

            NonTerminal::ComparisonPrime => {
                if kind != TokenKind::Comparator {
                    return self.dispatch_failure("COMPARISON_PRIME", required);
                }
                self.binary_tail(
                    parent,
                    "COMPARISON_PRIME",
                    NonTerminal::ComparisonPrime,
                    TokenKind::Comparator,
                    &lexeme,
                    NonTerminal::Bitwise,
                    required,
                )
            }

            NonTerminal::Bitwise => self.binary_head(
                parent,
                "BITWISE",
                NonTerminal::Bitwise,
                NonTerminal::Operand,
                NonTerminal::BitwisePrime,
            ),

            NonTerminal::BitwisePrime => {
                if kind != TokenKind::Bitwise {
                    return self.dispatch_failure("BITWISE_PRIME", required);
                }
                self.binary_tail(
                    parent,
                    "BITWISE_PRIME",
                    NonTerminal::BitwisePrime,
                    TokenKind::Bitwise,
                    &lexeme,
                    NonTerminal::Operand,
                    required,
                )
            }

            NonTerminal::Operand => self.binary_head(
                parent,
                "OPERAND",
                NonTerminal::Operand,
                NonTerminal::Term,
                NonTerminal::OperandPrime,
            ),

            NonTerminal::OperandPrime => {
                if kind != TokenKind::Operator || !matches!(lexeme.as_str(), "+" | "-") {
                    return self.dispatch_failure("OPERAND_PRIME", required);
                }
                self.binary_tail(
                    parent,
                    "OPERAND_PRIME",
                    NonTerminal::OperandPrime,
                    TokenKind::Operator,
                    &lexeme,
                    NonTerminal::Term,
                    required,
                )
            }

            NonTerminal::Term => self.binary_head(
                parent,
                "TERM",
                NonTerminal::Term,
                NonTerminal::Factor,
                NonTerminal::TermPrime,
            ),

            NonTerminal::TermPrime => {
                if kind != TokenKind::Operator
                    || !matches!(lexeme.as_str(), "*" | "//" | "/" | "%")
                {
                    return self.dispatch_failure("TERM_PRIME", required);
                }
                self.binary_tail(
                    parent,
                    "TERM_PRIME",
                    NonTerminal::TermPrime,
                    TokenKind::Operator,
                    &lexeme,
                    NonTerminal::Factor,
                    required,
                )
            }

            NonTerminal::Factor => {
                let path = self.attach_under(&parent, Node::new("FACTOR", NodeAttrs::default()));
                let production = match kind {
                    TokenKind::Punctuation if lexeme == "(" => vec![
                        lit(TokenKind::Punctuation, "("),
                        WS_OPT,
                        nt(NonTerminal::Expression),
                        WS_OPT,
                        lit(TokenKind::Punctuation, ")"),
                    ],
                    TokenKind::None
                    | TokenKind::Boolean
                    | TokenKind::Int
                    | TokenKind::Float
                    | TokenKind::String => vec![t(kind)],
                    TokenKind::Identifier if self.call_follows() => {
                        vec![nt(NonTerminal::FunctionCall)]
                    }
                    TokenKind::Identifier => vec![t(TokenKind::Identifier)],
                    _ => return self.dispatch_failure("FACTOR", required),
                };
                self.activate(target, path, production)
            }
        }
    }

    /// Head of one precedence level: operand, optional whitespace, and the
    /// optional operator tail.
    fn binary_head(
        &mut self,
        parent: Option<Vec<usize>>,
        name: &'static str,
        target: NonTerminal,
        operand: NonTerminal,
        tail: NonTerminal,
    ) -> Result<Expansion, SyntaxError> {
        let path = self.attach_under(&parent, Node::new(name, NodeAttrs::default()));
        self.activate(target, path, vec![nt(operand), WS_OPT, nt_opt(tail)])
    }

    /// Tail of one precedence level, entered after dispatch accepted the
    /// operator lexeme.
    #[allow(clippy::too_many_arguments)]
    fn binary_tail(
        &mut self,
        parent: Option<Vec<usize>>,
        name: &'static str,
        target: NonTerminal,
        operator_kind: TokenKind,
        operator: &str,
        operand: NonTerminal,
        required: bool,
    ) -> Result<Expansion, SyntaxError> {
        let spelling = match pin(operator) {
            Some(spelling) => spelling,
            None => return self.dispatch_failure(name, required),
        };
        let path = self.attach_under(&parent, Node::new(name, NodeAttrs::default()));
        self.activate(
            target,
            path,
            vec![
                lit(operator_kind, spelling),
                WS_OPT,
                nt(operand),
                WS_OPT,
                nt_opt(target),
            ],
        )
    }

    /// Record the node, push the production, and suspend.
    fn activate(
        &mut self,
        target: NonTerminal,
        path: Vec<usize>,
        production: Vec<GrammarSymbol>,
    ) -> Result<Expansion, SyntaxError> {
        if self.frames.len() >= MAX_STACK_DEPTH {
            return Err(SyntaxError::derivation_too_deep(
                self.frames.len(),
                self.cursor,
            ));
        }

        log_debug!("expanded non-terminal",
            "symbol" => target,
            "production_len" => production.len(),
            "depth" => self.frames.len() + 1
        );

        for symbol in production.iter().rev() {
            self.stack.push(*symbol);
        }
        self.frames.push(Frame {
            nt: target,
            production,
            next: 0,
            path,
        });
        Ok(Expansion::Suspended)
    }

    /// Attach `node` under `parent`, or install it as the root.
    fn attach_under(&mut self, parent: &Option<Vec<usize>>, node: Node) -> Vec<usize> {
        match parent {
            Some(path) => self.attach(path, node),
            None => {
                self.root = Some(node);
                Vec::new()
            }
        }
    }

    fn indent_of(&self, parent: &Option<Vec<usize>>) -> usize {
        match parent {
            Some(path) => self.indent_at(path),
            None => 0,
        }
    }

    fn dispatch_failure(
        &self,
        symbol: &'static str,
        required: bool,
    ) -> Result<Expansion, SyntaxError> {
        if !required {
            return Ok(Expansion::Epsilon);
        }
        let token = self.lookahead();
        if token.is_eof() {
            return Err(SyntaxError::unexpected_end_of_input(symbol, self.cursor));
        }
        Err(SyntaxError::unexpected_symbol(symbol, token))
    }

    /// An assignment token within the next two positions marks the
    /// identifier as an assignment target rather than an expression head.
    fn assignment_follows(&self) -> bool {
        (1..=2).any(|n| {
            self.peek(n)
                .map_or(false, |token| token.kind == TokenKind::Assignment)
        })
    }

    /// An opening parenthesis within the next two positions marks the
    /// identifier as a call head.
    fn call_follows(&self) -> bool {
        (1..=2).any(|n| self.peek(n).map_or(false, |token| token.lexeme == "("))
    }

    /// `expected` at the lookahead itself or one position past it, to see
    /// through a single leading whitespace token.
    fn lexeme_within_one(&self, expected: &str) -> bool {
        (0..=1).any(|n| self.peek(n).map_or(false, |token| token.lexeme == expected))
    }

    /// Lookahead categories that can begin an expression derivation.
    fn starts_expression(&self, kind: TokenKind, lexeme: &str) -> bool {
        match kind {
            TokenKind::None
            | TokenKind::Boolean
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::String
            | TokenKind::Identifier => true,
            TokenKind::Punctuation => lexeme == "(",
            _ => false,
        }
    }
}
