//! Shared utility types

pub mod position;

pub use position::Position;
