//! Configuration module
//!
//! Compile-time limits live in [`constants`]; runtime logging
//! preferences are read from the environment by `logging::config`.

pub mod constants;
