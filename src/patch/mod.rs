//! Locate-and-Patch Engine
//!
//! Takes a save request from the visual editor, finds the JSX element it
//! addresses, and plans the attribute edits that write the changed prop
//! values back into the source text.

pub mod engine;

pub use engine::{apply_save, plan_edits, render_value, PatchError, PatchOutcome, PatchPlan};

use serde::Deserialize;
use serde_json::{Map, Value};

/// Where the edited element lives, as reported by the running application
///
/// Line and column are both 1-based on the wire; internally columns are
/// 0-based, so lookups subtract one from `column_number`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_name: String,
    pub line_number: u32,
    pub column_number: u32,
}

/// A single edit event: one element, a map of changed prop values
#[derive(Debug, Clone, Deserialize)]
pub struct SaveRequest {
    pub source: SourceLocation,
    pub value: Map<String, Value>,
}
