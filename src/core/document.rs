//! Document Management
//!
//! Owned source text with a line-start index for position lookups, plus
//! back-to-front application of non-overlapping text edits. Untouched bytes
//! pass through unchanged, which is what preserves the original formatting.

use crate::core::span::{Position, Span};

/// A single replacement of a byte range with new text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: String) -> Self {
        Self { span, replacement }
    }

    pub fn insert(offset: usize, text: String) -> Self {
        Self {
            span: Span::empty(offset),
            replacement: text,
        }
    }
}

/// A source document with cached line starts
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(text: String) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a line/column position
    ///
    /// Columns count characters, not bytes, so multi-byte source text maps
    /// the way editors report it.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = self.text[line_start..offset].chars().count();
        Position::new(line_idx as u32 + 1, column as u32)
    }

    /// Convert a line/column position into a byte offset
    ///
    /// Returns `None` when the line does not exist or the column runs past
    /// the end of the line.
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line_idx = (position.line as usize).checked_sub(1)?;
        let line_start = *self.line_starts.get(line_idx)?;
        let line_end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(self.text.len());
        let line = &self.text[line_start..line_end];

        if position.column == 0 {
            return Some(line_start);
        }
        let mut remaining = position.column as usize;
        for (idx, ch) in line.char_indices() {
            if ch == '\n' {
                return None;
            }
            remaining -= 1;
            if remaining == 0 {
                return Some(line_start + idx + ch.len_utf8());
            }
        }
        None
    }

    /// Apply a set of non-overlapping edits, producing the new text
    ///
    /// Edits are applied from the back of the document forward so earlier
    /// spans never shift. Edits sharing a start offset appear in the output
    /// in the order given; the sort is stable.
    pub fn apply(&self, edits: &[TextEdit]) -> String {
        let mut ordered: Vec<&TextEdit> = edits.iter().collect();
        ordered.sort_by_key(|edit| edit.span.start);

        let mut result = self.text.clone();
        for edit in ordered.iter().rev() {
            result.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_line_starts() {
        let doc = Document::new("abc\ndef\n".to_string());
        assert_eq!(doc.position_at(0), Position::new(1, 0));
        assert_eq!(doc.position_at(4), Position::new(2, 0));
        assert_eq!(doc.position_at(6), Position::new(2, 2));
    }

    #[test]
    fn test_offset_at_round_trip() {
        let doc = Document::new("let x = 1;\nlet y = 2;\n".to_string());
        let offset = doc.offset_at(Position::new(2, 4)).unwrap();
        assert_eq!(&doc.text()[offset..offset + 1], "y");
        assert_eq!(doc.position_at(offset), Position::new(2, 4));
    }

    #[test]
    fn test_offset_at_rejects_out_of_range() {
        let doc = Document::new("short\n".to_string());
        assert_eq!(doc.offset_at(Position::new(3, 0)), None);
        assert_eq!(doc.offset_at(Position::new(1, 40)), None);
    }

    #[test]
    fn test_positions_with_crlf() {
        let doc = Document::new("a\r\nbc\r\n".to_string());
        assert_eq!(doc.position_at(3), Position::new(2, 0));
        assert_eq!(doc.offset_at(Position::new(2, 1)), Some(4));
    }

    #[test]
    fn test_multibyte_columns() {
        let doc = Document::new("// ünïcode\n<Box />\n".to_string());
        let offset = doc.offset_at(Position::new(2, 0)).unwrap();
        assert_eq!(&doc.text()[offset..offset + 1], "<");
        assert_eq!(doc.position_at(offset), Position::new(2, 0));
    }

    #[test]
    fn test_apply_edits_back_to_front() {
        let doc = Document::new("<Box a={1} b={2} />".to_string());
        let edits = vec![
            TextEdit::replace(Span::new(7, 10), "{9}".to_string()),
            TextEdit::replace(Span::new(13, 16), "{8}".to_string()),
        ];
        assert_eq!(doc.apply(&edits), "<Box a={9} b={8} />");
    }

    #[test]
    fn test_apply_insert() {
        let doc = Document::new("<Box />".to_string());
        let edits = vec![TextEdit::insert(4, " visible={true}".to_string())];
        assert_eq!(doc.apply(&edits), "<Box visible={true} />");
    }

    #[test]
    fn test_apply_inserts_at_same_offset_keep_given_order() {
        let doc = Document::new("<Box a />".to_string());
        let edits = vec![
            TextEdit::insert(6, "={1}".to_string()),
            TextEdit::insert(6, " b={2}".to_string()),
        ];
        assert_eq!(doc.apply(&edits), "<Box a={1} b={2} />");
    }

    #[test]
    fn test_apply_without_edits_is_identity() {
        let doc = Document::new("unchanged".to_string());
        assert_eq!(doc.apply(&[]), "unchanged");
    }
}
