//! Resumable parse engine
//!
//! A stack-driven predictive recursive-descent parser whose control flow
//! is an explicit continuation: each in-flight non-terminal is a frame
//! recording its chosen production and progress, so a derivation can be
//! suspended after every atomic grammar action and resumed later.

pub mod error;
mod expand;
pub mod session;

pub use error::SyntaxError;
pub use session::{Session, Status};
