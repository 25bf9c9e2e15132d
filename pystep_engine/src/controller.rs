//! Step controller
//!
//! Drives a parse session at three granularities: one grammar action,
//! one statement, or to completion. The controller also renders
//! observer snapshots of the session (status, cursor, visible stack,
//! current tree) for interop as JSON.

use crate::engine::error::SyntaxError;
use crate::engine::{Session, Status};
use crate::grammar::{Node, NonTerminal};
use serde::Serialize;

/// A point-in-time view of a session, cheap to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub status: Status,
    pub cursor: usize,
    /// Visible stack rendered bottom first (`punctuation:(`, `START?`, ...)
    pub stack: Vec<String>,
    /// Non-terminals currently being derived, outermost first
    pub derivation: Vec<String>,
    pub tree: Option<Node>,
}

pub struct StepController {
    session: Session,
    paused: bool,
}

impl StepController {
    pub fn new(source: &str) -> Self {
        Self::from_session(Session::from_source(source))
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            session,
            paused: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.paused = false;
    }

    /// Request that a running `run_to_completion` stop after the action
    /// it is currently on.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Perform one grammar action.
    pub fn step(&mut self) -> Result<Status, SyntaxError> {
        self.session.step()
    }

    /// Step until the derivation is back at a statement boundary: the
    /// stack top is a `START` or `BLOCK` expectation, so the next step
    /// begins a fresh statement. Always performs at least one action.
    pub fn skip_to_statement_boundary(&mut self) -> Result<Status, SyntaxError> {
        loop {
            let status = self.session.step()?;
            if status.is_terminal() {
                return Ok(status);
            }
            if self.at_statement_boundary() || self.session.lookahead_is_eof() {
                return Ok(status);
            }
        }
    }

    /// Step until the session completes or fails, honoring `pause`.
    pub fn run_to_completion(&mut self) -> Result<Status, SyntaxError> {
        loop {
            let status = self.session.step()?;
            if status.is_terminal() {
                return Ok(status);
            }
            if self.paused {
                self.paused = false;
                return Ok(status);
            }
        }
    }

    fn at_statement_boundary(&self) -> bool {
        self.session.stack_top().map_or(false, |symbol| {
            symbol.is_nonterminal(NonTerminal::Start) || symbol.is_nonterminal(NonTerminal::Block)
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.session.status(),
            cursor: self.session.cursor(),
            stack: self
                .session
                .stack()
                .iter()
                .map(|symbol| symbol.to_string())
                .collect(),
            derivation: self
                .session
                .derivation_path()
                .iter()
                .map(|nt| nt.name().to_string())
                .collect(),
            tree: self.session.tree().cloned(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
