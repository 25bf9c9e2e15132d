//! Parse session state and the step loop
//!
//! The session owns the token stream, the visible parse stack, the
//! continuation frames, and the growing syntax tree. One `step` performs
//! exactly one atomic grammar action: a terminal consume, a terminal
//! epsilon-skip, or a non-terminal expansion. Non-terminal epsilon
//! derivations are silent and fold into the following action.

use super::error::SyntaxError;
use super::expand::Expansion;
use crate::config::constants::compile_time;
use crate::grammar::{GrammarSymbol, Node, NonTerminal, SymbolKind};
use crate::lexical::tokenize;
use crate::logging::codes;
use crate::tokens::{SymbolTable, Token, TokenKind};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::fmt;

/// Session life-cycle states. `Completed` and `Failed` are absorbing;
/// only `reset` leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ready,
    Suspended,
    Completed,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ready => "READY",
            Status::Suspended => "SUSPENDED",
            Status::Completed => "COMPLETED",
            Status::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One in-flight non-terminal: its chosen production, how far the
/// production has been processed, and where its node lives in the tree.
#[derive(Debug, Clone)]
pub(super) struct Frame {
    pub(super) nt: NonTerminal,
    pub(super) production: Vec<GrammarSymbol>,
    pub(super) next: usize,
    pub(super) path: Vec<usize>,
}

impl Frame {
    fn is_exhausted(&self) -> bool {
        self.next >= self.production.len()
    }
}

pub struct Session {
    pub(super) tokens: Vec<Token>,
    pub(super) table: SymbolTable,
    pub(super) cursor: usize,
    pub(super) stack: Vec<GrammarSymbol>,
    pub(super) frames: Vec<Frame>,
    pub(super) root: Option<Node>,
    pub(super) status: Status,
    pub(super) last_error: Option<SyntaxError>,
}

impl Session {
    /// Create a session over an already-tokenized stream. The stream is
    /// normalized to end with the EOF token.
    pub fn new(mut tokens: Vec<Token>, table: SymbolTable) -> Self {
        if tokens.last().map_or(true, |t| !t.is_eof()) {
            let position = tokens
                .last()
                .map(|t| t.position().advance_str(&t.lexeme))
                .unwrap_or_default();
            tokens.push(Token::eof(position.line, position.column));
        }

        let mut session = Self {
            tokens,
            table,
            cursor: 0,
            stack: Vec::new(),
            frames: Vec::new(),
            root: None,
            status: Status::Ready,
            last_error: None,
        };
        session.reset();
        session
    }

    /// Tokenize `source` and create a session over the result.
    pub fn from_source(source: &str) -> Self {
        let (tokens, table) = tokenize(source);
        Self::new(tokens, table)
    }

    /// Discard all parse progress. The token stream is kept.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.stack.clear();
        self.stack
            .push(GrammarSymbol::nonterminal(NonTerminal::Start));
        self.frames.clear();
        self.root = None;
        self.status = Status::Ready;
        self.last_error = None;
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    /// Index of the next unconsumed token. Monotonic within a run.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The visible parse stack, bottom first.
    pub fn stack(&self) -> &[GrammarSymbol] {
        &self.stack
    }

    pub fn stack_top(&self) -> Option<&GrammarSymbol> {
        self.stack.last()
    }

    /// Non-terminals currently being derived, outermost first.
    pub fn derivation_path(&self) -> Vec<NonTerminal> {
        self.frames.iter().map(|frame| frame.nt).collect()
    }

    pub fn tree(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_error(&self) -> Option<&SyntaxError> {
        self.last_error.as_ref()
    }

    pub(super) fn lookahead(&self) -> &Token {
        // the stream always ends with EOF and the cursor never passes it
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    pub fn lookahead_is_eof(&self) -> bool {
        self.lookahead().is_eof()
    }

    /// Bounds-checked lookahead at `cursor + n`.
    pub(super) fn peek(&self, n: usize) -> Option<&Token> {
        debug_assert!(n <= compile_time::syntax::MAX_LOOKAHEAD_TOKENS);
        self.tokens.get(self.cursor + n)
    }

    /// Perform one atomic grammar action.
    ///
    /// Returns the status after the action. A syntax error is surfaced
    /// exactly once as `Err`; the session is then `Failed` and every
    /// further call reports that status until `reset`.
    pub fn step(&mut self) -> Result<Status, SyntaxError> {
        if self.status.is_terminal() {
            return Ok(self.status);
        }

        match self.advance() {
            Ok(()) => Ok(self.status),
            Err(err) => {
                self.status = Status::Failed;
                log_error!(err.error_code(), "derivation failed",
                    "error" => err,
                    "cursor" => self.cursor
                );
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        loop {
            while self.frames.last().map_or(false, Frame::is_exhausted) {
                self.frames.pop();
            }

            if self.frames.is_empty() {
                if self.root.is_none() {
                    // initial expansion of the start symbol
                    self.pop_expecting(GrammarSymbol::nonterminal(NonTerminal::Start));
                    match self.expand(NonTerminal::Start, true, None)? {
                        Expansion::Suspended => {
                            self.status = Status::Suspended;
                            return Ok(());
                        }
                        Expansion::Epsilon => continue,
                    }
                }

                // derivation exhausted
                debug_assert!(self.stack.is_empty());
                if self.lookahead_is_eof() {
                    self.status = Status::Completed;
                    log_success!(
                        codes::success::AST_CONSTRUCTION_COMPLETE,
                        "parse complete",
                        "tokens" => self.cursor,
                        "nodes" => self.root.as_ref().map_or(0, Node::size)
                    );
                }
                return Ok(());
            }

            let frame_idx = self.frames.len() - 1;
            let symbol = self.frames[frame_idx].production[self.frames[frame_idx].next];
            self.frames[frame_idx].next += 1;
            self.pop_expecting(symbol);

            match symbol.kind {
                SymbolKind::Terminal(kind) => {
                    self.terminal_action(frame_idx, symbol, kind)?;
                    // both a consume and an epsilon-skip suspend
                    self.status = Status::Suspended;
                    return Ok(());
                }
                SymbolKind::NonTerminal(nt) => {
                    let parent = self.frames[frame_idx].path.clone();
                    match self.expand(nt, !symbol.optional, Some(parent))? {
                        Expansion::Suspended => {
                            self.status = Status::Suspended;
                            return Ok(());
                        }
                        // a silent epsilon folds into the next action
                        Expansion::Epsilon => continue,
                    }
                }
            }
        }
    }

    /// Consume the lookahead for a matching terminal, or epsilon-skip an
    /// optional one. A required mismatch is a syntax error.
    fn terminal_action(
        &mut self,
        frame_idx: usize,
        symbol: GrammarSymbol,
        kind: TokenKind,
    ) -> Result<(), SyntaxError> {
        let token = self.lookahead();
        let matches =
            token.kind == kind && symbol.literal.map_or(true, |lexeme| token.lexeme == lexeme);

        if !matches {
            if symbol.optional {
                log_debug!("epsilon-skipped optional terminal", "symbol" => symbol);
                return Ok(());
            }
            let expected = match symbol.literal {
                Some(lexeme) => lexeme.to_string(),
                None => kind.as_str().to_string(),
            };
            return Err(SyntaxError::unexpected_token(
                kind.stack_name(),
                expected,
                token,
            ));
        }

        let leaf = Node::leaf(kind.stack_name(), token.lexeme.clone());
        log_debug!("consumed token",
            "symbol" => symbol,
            "lexeme" => token.lexeme,
            "cursor" => self.cursor
        );

        let path = self.frames[frame_idx].path.clone();
        self.attach(&path, leaf);
        self.cursor += 1;
        Ok(())
    }

    /// Pop the visible stack and verify it agrees with the continuation.
    /// A mismatch means the stack and the frames have diverged, which is
    /// an engine defect, not an input condition.
    pub(super) fn pop_expecting(&mut self, expected: GrammarSymbol) {
        match self.stack.pop() {
            Some(top) if top == expected => {}
            Some(top) => panic!("parse stack desynchronized: popped {top}, expected {expected}"),
            None => panic!("parse stack empty while {expected} pending"),
        }
    }

    /// Attach `child` under the node at `parent_path`, returning the
    /// child's path.
    pub(super) fn attach(&mut self, parent_path: &[usize], child: Node) -> Vec<usize> {
        let root = match self.root.as_mut() {
            Some(root) => root,
            None => panic!("no tree root while attaching {}", child.name),
        };
        let parent = match root.get_mut(parent_path) {
            Some(parent) => parent,
            None => panic!("dangling tree path {parent_path:?}"),
        };
        let index = parent.push_child(child);
        let mut path = parent_path.to_vec();
        path.push(index);
        path
    }

    /// Indent threshold recorded on the node at `path` (0 when absent).
    pub(super) fn indent_at(&self, path: &[usize]) -> usize {
        self.root
            .as_ref()
            .and_then(|root| root.get(path))
            .and_then(|node| node.attributes.indent)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn run(session: &mut Session) -> Result<Status, SyntaxError> {
        loop {
            let status = session.step()?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }

    fn child<'a>(node: &'a Node, path: &[usize]) -> &'a Node {
        node.get(path).expect("path should resolve")
    }

    #[test]
    fn test_assignment_statement_parses_to_completion() {
        let mut session = Session::from_source("x = 1\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);

        let root = session.tree().expect("tree exists");
        assert_eq!(root.name, "START");
        assert_eq!(root.attributes.indent, Some(0));

        // START -> STATEMENT -> SIMPLE -> identifier ws assignment ws EXPRESSION
        let simple = child(root, &[0, 0]);
        assert_eq!(simple.name, "SIMPLE");
        assert_eq!(simple.children[0].name, "identifier");
        assert_eq!(simple.children[0].attributes.lexval.as_deref(), Some("x"));
        assert_eq!(simple.children[2].name, "assignment");

        let expression = &simple.children[4];
        assert_eq!(expression.name, "EXPRESSION");
        // the derivation bottoms out at FACTOR -> int
        let factor = child(expression, &[0, 0, 0, 0, 0]);
        assert_eq!(factor.name, "FACTOR");
        assert_eq!(factor.children[0].name, "int");
        assert_eq!(factor.children[0].attributes.lexval.as_deref(), Some("1"));
    }

    #[test]
    fn test_first_step_suspends_after_start_expansion() {
        let mut session = Session::from_source("x = 1\n");
        assert_eq!(session.status(), Status::Ready);

        let status = session.step().expect("expansion succeeds");
        assert_eq!(status, Status::Suspended);
        // START expanded to STATEMENT then START?, left-to-right
        let stack: Vec<String> = session.stack().iter().map(|s| s.to_string()).collect();
        assert_eq!(stack, vec!["START?", "STATEMENT"]);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_cursor_is_monotonic_and_stack_reaches_empty() {
        let mut session = Session::from_source("x = 1\ny = 2\n");
        let mut previous = session.cursor();
        loop {
            let status = session.step().expect("well-formed input");
            assert!(session.cursor() >= previous, "cursor must never regress");
            previous = session.cursor();
            if status.is_terminal() {
                break;
            }
        }
        assert_eq!(session.status(), Status::Completed);
        assert!(session.stack().is_empty());
        assert!(session.lookahead_is_eof());
    }

    #[test]
    fn test_terminal_epsilon_skip_suspends_without_consuming() {
        // no whitespace around "=": the whitespace? expectations skip
        let mut session = Session::from_source("x=1\n");
        let mut saw_skip = false;
        loop {
            let before = session.cursor();
            let status = session.step().expect("well-formed input");
            if status == Status::Suspended && session.cursor() == before && before > 0 {
                saw_skip = true;
            }
            if status.is_terminal() {
                break;
            }
        }
        assert!(saw_skip, "an epsilon-skip must still suspend");
        assert_eq!(session.status(), Status::Completed);
    }

    #[test]
    fn test_if_block_parses_with_indentation() {
        let mut session = Session::from_source("if True:\n    pass\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);

        let root = session.tree().expect("tree exists");
        let compound = child(root, &[0, 0]);
        assert_eq!(compound.name, "COMPOUND");
        assert_eq!(compound.attributes.indent, Some(4));

        let if_node = &compound.children[0];
        assert_eq!(if_node.name, "IF");
        let block = if_node
            .children
            .iter()
            .find(|n| n.name == "BLOCK")
            .expect("IF derives a BLOCK");
        assert_eq!(block.attributes.indent, Some(4));
        assert_eq!(block.children[0].name, "whitespace");
        assert_eq!(
            block.children[0].attributes.lexval.as_deref(),
            Some("    ")
        );

        // the optional ELIF slot still records an (empty) ELIF node
        let elif = if_node
            .children
            .iter()
            .find(|n| n.name == "ELIF")
            .expect("IF always records its ELIF slot");
        assert!(elif.children.is_empty());
    }

    #[test]
    fn test_dedent_terminates_block() {
        let mut session = Session::from_source("if True:\n    pass\nx = 1\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);

        let root = session.tree().expect("tree exists");
        // the second statement hangs off the nested START, not the block
        let nested_start = root
            .children
            .iter()
            .find(|n| n.name == "START")
            .expect("second statement opens a nested START");
        assert_eq!(nested_start.children[0].name, "STATEMENT");
    }

    #[test]
    fn test_elif_chain() {
        let source = "if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n";
        let mut session = Session::from_source(source);
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);

        let root = session.tree().expect("tree exists");
        let if_node = child(root, &[0, 0, 0]);
        assert_eq!(if_node.name, "IF");
        let elif = if_node
            .children
            .iter()
            .find(|n| n.name == "ELIF")
            .expect("elif branch recorded");
        assert!(elif.children.iter().any(|n| n.name == "BLOCK"));
        let nested_elif = elif
            .children
            .iter()
            .find(|n| n.name == "ELIF")
            .expect("chain continues");
        assert!(nested_elif.children.iter().any(|n| n.name == "ELSE"));
    }

    #[test]
    fn test_function_definition_and_call() {
        let source = "def add(a, b):\n    return a + b\nadd(1, 2)\n";
        let mut session = Session::from_source(source);
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);

        let root = session.tree().expect("tree exists");
        let function = child(root, &[0, 0, 0]);
        assert_eq!(function.name, "FUNCTION");
        let args = function
            .children
            .iter()
            .find(|n| n.name == "ARGS")
            .expect("parameter list recorded");
        assert_eq!(args.children[0].name, "identifier");
    }

    #[test]
    fn test_syntax_error_fails_and_is_absorbing() {
        // an assignment token cannot begin a statement
        let mut session = Session::from_source("= 1\n");
        let error = loop {
            match session.step() {
                Ok(status) => assert!(!status.is_terminal(), "must fail before completing"),
                Err(err) => break err,
            }
        };
        assert_matches!(error, SyntaxError::UnexpectedToken { symbol: "SIMPLE", .. });
        assert_eq!(session.status(), Status::Failed);
        assert_eq!(session.last_error(), Some(&error));

        // the error is surfaced once; afterwards the state is absorbing
        let frozen = session.cursor();
        assert_eq!(session.step(), Ok(Status::Failed));
        assert_eq!(session.step(), Ok(Status::Failed));
        assert_eq!(session.cursor(), frozen);
    }

    #[test]
    fn test_empty_input_is_a_syntax_error() {
        let mut session = Session::from_source("");
        let result = session.step();
        assert_matches!(
            result,
            Err(SyntaxError::UnexpectedEndOfInput { symbol: "START", .. })
        );
        assert_eq!(session.status(), Status::Failed);
    }

    #[test]
    fn test_completed_is_absorbing() {
        let mut session = Session::from_source("pass\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);

        let cursor = session.cursor();
        assert_eq!(session.step(), Ok(Status::Completed));
        assert_eq!(session.cursor(), cursor);
    }

    #[test]
    fn test_reset_restores_ready_state() {
        let mut session = Session::from_source("= 1\n");
        let _ = loop {
            match session.step() {
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert_eq!(session.status(), Status::Failed);

        session.reset();
        assert_eq!(session.status(), Status::Ready);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.stack().len(), 1);
        assert!(session.tree().is_none());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_operator_precedence_chain_derives() {
        let mut session = Session::from_source("x = 1 + 2 * 3 << 1 <= 4 and y\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn test_parenthesized_expression_statement() {
        let mut session = Session::from_source("(1 + 2) * 3\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn test_while_with_else() {
        let source = "while x < 3:\n    x = x + 1\nelse:\n    pass\n";
        let mut session = Session::from_source(source);
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn test_for_loop() {
        let mut session = Session::from_source("for i in items:\n    pass\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn test_comment_only_statement() {
        let mut session = Session::from_source("# just a comment\n");
        let status = run(&mut session).expect("well-formed input");
        assert_eq!(status, Status::Completed);
    }
}
