//! JSX Editor Server
//!
//! A development-server companion that lets a running application's visual
//! editor write prop changes back into JSX source files.
//!
//! This library provides:
//! - A tolerant JSX opening-element scanner with byte-accurate spans
//! - A locate-and-patch engine that rewrites attributes in place
//! - A self-expiring "just edited" hold that suppresses the file watcher
//!   for programmatic writes
//! - A WebSocket RPC server exposing the `save` entry point
//! - Configuration management

pub mod config;
pub mod core;
pub mod parser;
pub mod patch;
pub mod reload;
pub mod rpc;
pub mod watch;

// Re-exports for clean public API
pub use crate::config::Config;
pub use crate::core::{Document, Position, Span, TextEdit};
pub use crate::parser::{parse_elements, JsxAttribute, JsxElement};
pub use crate::patch::{apply_save, PatchError, SaveRequest};
pub use crate::reload::EditHold;
