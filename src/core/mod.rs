//! Core Text Model
//!
//! Byte spans, line/column positions, and in-place document editing.

pub mod document;
pub mod span;

pub use document::{Document, TextEdit};
pub use span::{Position, Span};
