//! JSX Parser
//!
//! Tolerant scanning of JS/TS/JSX source for opening elements.
//! Focused solely on finding elements and attribute spans; patching
//! decisions live in the patch engine.

pub mod ast;
pub mod lexer;

pub use ast::{elements_from_raw, JsxAttribute, JsxElement};
pub use lexer::{scan_source, RawAttribute, RawElement};

use crate::core::Document;

/// Parse a document into its JSX opening elements
///
/// This is the main entry point for parsing. It scans the raw text and
/// attaches line/column positions from the document's line index.
pub fn parse_elements(document: &Document) -> Vec<JsxElement> {
    let raw = lexer::scan_source(document.text());
    ast::elements_from_raw(document, raw)
}
