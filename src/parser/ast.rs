//! JSX Element Types
//!
//! Plain data produced by the scanner, enriched with line/column positions.
//! No patching logic or RPC concerns - pure data representation.

use crate::core::{Document, Position, Span};
use crate::parser::lexer::RawElement;

/// A JSX attribute with byte-accurate spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxAttribute {
    /// Attribute name, or `"..."` for spread attributes
    pub name: String,
    /// Span of the name token
    pub name_span: Span,
    /// Span of the value initializer (`"..."` or `{...}`), absent for bare
    /// attributes like `visible`
    pub value_span: Option<Span>,
    pub spread: bool,
}

/// A JSX opening element with byte-accurate spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxElement {
    /// Tag name (e.g. `mesh`, `Editor.Panel`)
    pub name: String,
    /// Span from the `<` to just past the closing `>`
    pub span: Span,
    /// Position of the `<`, the coordinate edit events address
    pub start: Position,
    pub attributes: Vec<JsxAttribute>,
    pub self_closing: bool,
    /// Offset where ` name={expr}` can be spliced in for a new attribute
    pub insert_offset: usize,
}

impl JsxElement {
    /// Look up a named (non-spread) attribute
    pub fn attribute(&self, name: &str) -> Option<&JsxAttribute> {
        self.attributes
            .iter()
            .find(|attr| !attr.spread && attr.name == name)
    }
}

/// Convert raw scanner output into elements addressed by position
pub fn elements_from_raw(document: &Document, raw: Vec<RawElement>) -> Vec<JsxElement> {
    raw.into_iter()
        .map(|element| JsxElement {
            start: document.position_at(element.open),
            span: Span::new(element.open, element.end),
            name: element.name,
            attributes: element
                .attributes
                .into_iter()
                .map(|attr| JsxAttribute {
                    name: attr.name,
                    name_span: attr.name_span,
                    value_span: attr.value_span,
                    spread: attr.spread,
                })
                .collect(),
            self_closing: element.self_closing,
            insert_offset: element.insert_offset,
        })
        .collect()
}
