//! Patch Engine
//!
//! Pure logic over parser output: locate the addressed element, render the
//! changed prop values as attribute initializers, and plan span edits.
//! Separated from file I/O and RPC concerns.

use serde_json::Value;
use thiserror::Error;

use crate::core::{Document, Position, TextEdit};
use crate::parser::{parse_elements, JsxElement};
use crate::patch::SaveRequest;

/// Errors from locating or patching an element
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("no JSX element opens at {file}:{line}:{column}")]
    ElementNotFound {
        file: String,
        line: u32,
        column: u32,
    },
    #[error("invalid source position {line}:{column} (line and column are 1-based)")]
    InvalidPosition { line: u32, column: u32 },
    #[error("save request carries no changed values")]
    EmptyValue,
}

/// Planned edits for one save request
#[derive(Debug, Clone)]
pub struct PatchPlan {
    pub edits: Vec<TextEdit>,
    /// True when at least one attribute did not exist and had to be added.
    /// Insertions change the element's shape, so the reload for this write
    /// must not be suppressed.
    pub inserted_any: bool,
}

/// Result of applying a save request to a document
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub text: String,
    pub inserted_any: bool,
}

/// Render a JSON prop value as a JSX attribute initializer
///
/// Everything is wrapped in an expression container, mirroring how the
/// editor round-trips values: `{[1, 2, 3]}`, `{true}`, `{0.5}`, `{"text"}`.
pub fn render_value(value: &Value) -> String {
    format!("{{{}}}", render_expression(value))
}

fn render_expression(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_expression).collect();
            format!("[{}]", rendered.join(", "))
        }
        // Null, booleans, numbers, strings, and objects all print as valid
        // JS expressions through serde_json's Display.
        other => other.to_string(),
    }
}

/// Plan the edits for a save request against already-parsed elements
pub fn plan_edits(elements: &[JsxElement], request: &SaveRequest) -> Result<PatchPlan, PatchError> {
    let line = request.source.line_number;
    let column = request.source.column_number;
    if line == 0 || column == 0 {
        return Err(PatchError::InvalidPosition { line, column });
    }
    if request.value.is_empty() {
        return Err(PatchError::EmptyValue);
    }

    let target = Position::new(line, column - 1);
    let element = elements
        .iter()
        .find(|el| el.start == target)
        .ok_or_else(|| PatchError::ElementNotFound {
            file: request.source.file_name.clone(),
            line,
            column,
        })?;

    let mut edits = Vec::new();
    let mut insertions = Vec::new();

    for (prop, value) in &request.value {
        let rendered = render_value(value);
        match element.attribute(prop) {
            Some(attr) => match attr.value_span {
                Some(span) => edits.push(TextEdit::replace(span, rendered)),
                // Bare attribute like `visible`: append an initializer
                None => edits.push(TextEdit::insert(attr.name_span.end, format!("={rendered}"))),
            },
            None => {
                insertions.push(TextEdit::insert(
                    element.insert_offset,
                    format!(" {prop}={rendered}"),
                ));
            }
        }
    }

    // New attributes land after the existing ones. When the last attribute
    // is bare, its appended initializer targets the same offset as the
    // insertion point, and `Document::apply` keeps the given order there.
    let inserted_any = !insertions.is_empty();
    edits.extend(insertions);

    Ok(PatchPlan {
        edits,
        inserted_any,
    })
}

/// Parse, locate, patch: the full save sequence over an in-memory document
pub fn apply_save(document: &Document, request: &SaveRequest) -> Result<PatchOutcome, PatchError> {
    let elements = parse_elements(document);
    let plan = plan_edits(&elements, request)?;
    Ok(PatchOutcome {
        text: document.apply(&plan.edits),
        inserted_any: plan.inserted_any,
    })
}
