//! JSX Scanner
//!
//! Tolerant, single-pass extraction of JSX opening elements from JS/TS
//! source. Focus: find every `<Name ...>` / `<Name ... />` with byte-accurate
//! spans while skipping string literals, template literals, and comments.
//! Expression containers (`{ ... }`) are scanned recursively, so elements
//! nested in attribute values or template substitutions are found too.
//!
//! The scanner is deliberately forgiving: a `<` that does not turn out to be
//! a real opening tag is abandoned and scanning resumes one byte later. False
//! candidates are harmless because callers only ever match elements by the
//! exact line/column of the `<`.

use crate::core::Span;

/// An attribute as found in the raw source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// Attribute name, or `"..."` for spread attributes
    pub name: String,
    /// Span of the name (or of the whole `{...expr}` for spreads)
    pub name_span: Span,
    /// Span of the value token (`"..."`, `'...'`, or `{...}`), if any
    pub value_span: Option<Span>,
    /// Spread attributes are recorded but never matched by name
    pub spread: bool,
}

/// An opening element as found in the raw source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    /// Tag name, e.g. `mesh` or `Editor.Panel`
    pub name: String,
    /// Byte offset of the `<`
    pub open: usize,
    /// Byte offset one past the closing `>`
    pub end: usize,
    pub attributes: Vec<RawAttribute>,
    pub self_closing: bool,
    /// Offset where ` name={expr}` can be spliced in for a new attribute
    pub insert_offset: usize,
}

/// Scan a source file for JSX opening elements
pub fn scan_source(src: &str) -> Vec<RawElement> {
    let mut scanner = Scanner::new(src);
    while let Some(byte) = scanner.peek() {
        match byte {
            b'"' | b'\'' => scanner.skip_string(byte),
            b'`' => scanner.skip_template(),
            b'/' if scanner.peek_at(1) == Some(b'/') => scanner.skip_line_comment(),
            b'/' if scanner.peek_at(1) == Some(b'*') => scanner.skip_block_comment(),
            b'<' => scanner.scan_angle(),
            _ => scanner.bump(),
        }
    }
    scanner.elements
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    elements: Vec<RawElement>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            elements: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Attempt an opening element at the current `<`; on failure resume one
    /// byte past it.
    fn scan_angle(&mut self) {
        let open = self.pos;
        match self.try_scan_element() {
            Some(element) => self.elements.push(element),
            None => self.pos = open + 1,
        }
    }

    /// Skip a quoted string. Tolerant: an unterminated string ends at the
    /// newline so one bad literal cannot swallow the rest of the file.
    fn skip_string(&mut self, quote: u8) {
        self.bump();
        while let Some(byte) = self.peek() {
            match byte {
                b'\\' => {
                    self.bump();
                    self.bump();
                }
                b'\n' => return,
                b if b == quote => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    /// Skip a template literal. Text is ignored, but `${ ... }`
    /// substitutions hold real code and are scanned like any other braces.
    fn skip_template(&mut self) {
        self.bump();
        while let Some(byte) = self.peek() {
            match byte {
                b'\\' => {
                    self.bump();
                    self.bump();
                }
                b'`' => {
                    self.bump();
                    return;
                }
                b'$' if self.peek_at(1) == Some(b'{') => {
                    self.bump();
                    self.scan_balanced_braces();
                }
                _ => self.bump(),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(byte) = self.peek() {
            if byte == b'\n' {
                return;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        self.bump();
        self.bump();
        while let Some(byte) = self.peek() {
            if byte == b'*' && self.peek_at(1) == Some(b'/') {
                self.bump();
                self.bump();
                return;
            }
            self.bump();
        }
    }

    /// Consume a `{ ... }` block, honoring strings, templates, and comments
    /// inside it and scanning nested elements. Assumes the scanner sits on
    /// the opening brace.
    fn scan_balanced_braces(&mut self) {
        debug_assert_eq!(self.peek(), Some(b'{'));
        let mut depth = 0usize;
        while let Some(byte) = self.peek() {
            match byte {
                b'{' => {
                    depth += 1;
                    self.bump();
                }
                b'}' => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                b'"' | b'\'' => self.skip_string(byte),
                b'`' => self.skip_template(),
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
                b'<' => self.scan_angle(),
                _ => self.bump(),
            }
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\r' | b'\n' => self.bump(),
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn scan_name(&mut self, extra: &[u8]) -> Option<String> {
        let start = self.pos;
        match self.peek() {
            Some(byte) if is_ident_start(byte) => self.bump(),
            _ => return None,
        }
        while let Some(byte) = self.peek() {
            if is_ident_continue(byte) || extra.contains(&byte) {
                self.bump();
            } else {
                break;
            }
        }
        Some(self.src[start..self.pos].to_string())
    }

    /// Try to scan an opening element at the current `<`
    ///
    /// Returns `None` when the candidate turns out not to be a tag; the
    /// caller resumes scanning one byte past the `<`.
    fn try_scan_element(&mut self) -> Option<RawElement> {
        let open = self.pos;
        self.bump();

        // Tag names may be member expressions (Editor.Panel), namespaced
        // (svg:path), or dashed web components.
        let name = self.scan_name(&[b'.', b':', b'-'])?;
        let mut insert_offset = self.pos;
        let mut attributes = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'>') => {
                    self.bump();
                    return Some(RawElement {
                        name,
                        open,
                        end: self.pos,
                        attributes,
                        self_closing: false,
                        insert_offset,
                    });
                }
                Some(b'/') if self.peek_at(1) == Some(b'>') => {
                    self.bump();
                    self.bump();
                    return Some(RawElement {
                        name,
                        open,
                        end: self.pos,
                        attributes,
                        self_closing: true,
                        insert_offset,
                    });
                }
                Some(b'{') => {
                    let start = self.pos;
                    self.scan_balanced_braces();
                    attributes.push(RawAttribute {
                        name: "...".to_string(),
                        name_span: Span::new(start, self.pos),
                        value_span: None,
                        spread: true,
                    });
                    insert_offset = self.pos;
                }
                Some(byte) if is_ident_start(byte) => {
                    let name_start = self.pos;
                    let attr_name = self.scan_name(&[b'-', b':'])?;
                    let name_span = Span::new(name_start, self.pos);
                    self.skip_trivia();

                    let value_span = if self.peek() == Some(b'=') {
                        self.bump();
                        self.skip_trivia();
                        let value_start = self.pos;
                        match self.peek() {
                            Some(quote @ (b'"' | b'\'')) => self.skip_string(quote),
                            Some(b'{') => self.scan_balanced_braces(),
                            _ => return None,
                        }
                        Some(Span::new(value_start, self.pos))
                    } else {
                        None
                    };

                    insert_offset = value_span.map(|span| span.end).unwrap_or(name_span.end);
                    attributes.push(RawAttribute {
                        name: attr_name,
                        name_span,
                        value_span,
                        spread: false,
                    });
                }
                _ => return None,
            }
        }
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}
