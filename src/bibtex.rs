//! Best-effort BibTeX reader.
//!
//! Turns `.bib` source into a [`Document`]: a list of records (macro
//! definitions and entries) plus a list of [`Diagnostic`]s for anything that
//! could not be read. A broken record is dropped and reading resumes at the
//! next `@`, so one typo never costs the whole bibliography.
//!
//! ## What is understood
//!
//! ```text
//! @string{acl = "Association for Computational Linguistics"}
//! @inproceedings{riedel10,
//!   author    = {Sebastian Riedel and Andrew McCallum},
//!   title     = "Modeling {Relations}",
//!   booktitle = "Proc. of " # acl,
//!   year      = 2010,
//! }
//! ```
//!
//! - `@string` → [`Record::Macro`]
//! - `@comment`, `@preamble` → skipped
//! - anything else → [`Record::Entry`]
//!
//! Values are one or more pieces joined by `#`: braced or quoted strings
//! become [`FieldValue::Leaf`], bare numbers [`FieldValue::Other`], bare
//! identifiers [`FieldValue::MacroReference`].
//!
//! Entry types, field names and macro names are lowercased; citation keys
//! keep their case.

use crate::types::{Entry, FieldValue, Person};
use indexmap::IndexMap;
use thiserror::Error;

/// A problem found while reading, with the 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

/// A top-level item of a `.bib` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Macro { key: String, value: FieldValue },
    Entry(Entry),
}

/// Everything read from one `.bib` source.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fields rewritten by [`Document::expand_person_lists`].
const PERSON_FIELDS: &[&str] = &["author", "editor"];

impl Document {
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.records.iter().filter_map(|r| match r {
            Record::Entry(entry) => Some(entry),
            Record::Macro { .. } => None,
        })
    }

    /// `@string` definitions in source order.
    pub fn macro_definitions(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.records.iter().filter_map(|r| match r {
            Record::Macro { key, value } => Some((key.as_str(), value)),
            Record::Entry(_) => None,
        })
    }

    /// Replace plain-string `author`/`editor` fields with person lists.
    ///
    /// Only single string values are split; concatenations and macro
    /// references are left alone since their text is not known yet.
    pub fn expand_person_lists(mut self) -> Self {
        for record in &mut self.records {
            let Record::Entry(entry) = record else {
                continue;
            };
            for name in PERSON_FIELDS {
                if let Some(value) = entry.fields.get_mut(*name)
                    && let FieldValue::Leaf(text) | FieldValue::Other(text) = value
                {
                    *value = FieldValue::PersonList(parse_person_list(text));
                }
            }
        }
        self
    }
}

/// Split an `"A and B and C"` name list into people.
///
/// Each name is read as `Last, First` when it contains a comma, otherwise
/// the final word is the last name and everything before it the first name.
pub fn parse_person_list(text: &str) -> Vec<Person> {
    text.split(" and ")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(parse_person)
        .collect()
}

fn parse_person(name: &str) -> Person {
    if let Some((last, first)) = name.split_once(',') {
        return Person {
            first: first.trim().to_string(),
            last: last.trim().to_string(),
        };
    }
    match name.rsplit_once(char::is_whitespace) {
        Some((first, last)) => Person {
            first: first.trim().to_string(),
            last: last.to_string(),
        },
        None => Person {
            first: String::new(),
            last: name.to_string(),
        },
    }
}

/// Read a `.bib` source. Never fails; problems end up in `diagnostics`.
pub fn parse(src: &str) -> Document {
    let mut reader = Reader {
        src,
        bytes: src.as_bytes(),
        pos: 0,
    };
    let mut doc = Document::default();

    while reader.skip_to_record() {
        let start = reader.pos;
        match reader.record(&mut doc.diagnostics) {
            Ok(Some(record)) => doc.records.push(record),
            Ok(None) => {}
            Err(diagnostic) => {
                doc.diagnostics.push(diagnostic);
                reader.pos = start + 1;
            }
        }
    }

    doc
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Byte cursor over the source. All delimiters are ASCII, so slicing at
/// their positions always lands on UTF-8 boundaries.
struct Reader<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn line(&self) -> usize {
        let end = self.pos.min(self.bytes.len());
        1 + self.bytes[..end].iter().filter(|&&b| b == b'\n').count()
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            line: self.line(),
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Advance to the next `@`. Returns false at end of input.
    fn skip_to_record(&mut self) -> bool {
        match self.bytes[self.pos.min(self.bytes.len())..]
            .iter()
            .position(|&b| b == b'@')
        {
            Some(offset) => {
                self.pos += offset;
                true
            }
            None => {
                self.pos = self.bytes.len();
                false
            }
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), Diagnostic> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}' but found '{}'",
                expected as char, b as char
            ))),
            None => Err(self.error(format!(
                "expected '{}' but reached end of input",
                expected as char
            ))),
        }
    }

    fn identifier(&mut self) -> Result<&'a str, Diagnostic> {
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_byte) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected an identifier"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn record(&mut self, diagnostics: &mut Vec<Diagnostic>) -> Result<Option<Record>, Diagnostic> {
        self.expect(b'@')?;
        self.skip_ws();
        let kind = self.identifier()?.to_ascii_lowercase();
        self.skip_ws();
        let (open, close) = match self.peek() {
            Some(b'{') => (b'{', b'}'),
            Some(b'(') => (b'(', b')'),
            _ => return Err(self.error(format!("expected '{{' or '(' after @{kind}"))),
        };
        self.pos += 1;

        match kind.as_str() {
            "comment" | "preamble" => {
                self.skip_balanced(open, close)?;
                Ok(None)
            }
            "string" => {
                self.skip_ws();
                let (key, value) = self.field()?;
                self.skip_ws();
                self.expect(close)?;
                Ok(Some(Record::Macro { key, value }))
            }
            _ => self
                .entry(kind, close, diagnostics)
                .map(|entry| Some(Record::Entry(entry))),
        }
    }

    fn skip_balanced(&mut self, open: u8, close: u8) -> Result<(), Diagnostic> {
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(self.error("unterminated record"))
    }

    fn entry(
        &mut self,
        entry_type: String,
        close: u8,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Entry, Diagnostic> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b != b',' && b != close && !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        let key = self.src[start..self.pos].to_string();
        if key.is_empty() {
            return Err(self.error(format!("@{entry_type} has no citation key")));
        }

        let mut fields = IndexMap::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                Some(b',') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => {}
                None => return Err(self.error(format!("unterminated entry `{key}`"))),
            }

            let (name, value) = self.field()?;
            if fields.insert(name.clone(), value).is_some() {
                diagnostics.push(self.error(format!(
                    "duplicate field `{name}` in `{key}`, keeping the last value"
                )));
            }

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {}
                Some(b) => {
                    return Err(self.error(format!(
                        "expected ',' after field `{name}` in `{key}` but found '{}'",
                        b as char
                    )));
                }
                None => return Err(self.error(format!("unterminated entry `{key}`"))),
            }
        }

        Ok(Entry {
            key,
            entry_type,
            fields,
        })
    }

    /// `name = value`
    fn field(&mut self) -> Result<(String, FieldValue), Diagnostic> {
        let name = self.identifier()?.to_ascii_lowercase();
        self.skip_ws();
        self.expect(b'=')?;
        self.skip_ws();
        let value = self.value()?;
        Ok((name, value))
    }

    fn value(&mut self) -> Result<FieldValue, Diagnostic> {
        let mut value = self.piece()?;
        loop {
            self.skip_ws();
            if self.peek() != Some(b'#') {
                return Ok(value);
            }
            self.pos += 1;
            self.skip_ws();
            let right = self.piece()?;
            value = FieldValue::concat(value, right);
        }
    }

    fn piece(&mut self) -> Result<FieldValue, Diagnostic> {
        match self.peek() {
            Some(b'{') => {
                self.pos += 1;
                let start = self.pos;
                let mut depth = 1usize;
                while let Some(b) = self.peek() {
                    match b {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                let text = &self.src[start..self.pos];
                                self.pos += 1;
                                return Ok(FieldValue::leaf(text));
                            }
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
                Err(self.error("unterminated braced value"))
            }
            Some(b'"') => {
                self.pos += 1;
                let start = self.pos;
                let mut depth = 0usize;
                while let Some(b) = self.peek() {
                    match b {
                        b'{' => depth += 1,
                        b'}' => depth = depth.saturating_sub(1),
                        b'"' if depth == 0 => {
                            let text = &self.src[start..self.pos];
                            self.pos += 1;
                            return Ok(FieldValue::leaf(text));
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
                Err(self.error("unterminated quoted value"))
            }
            Some(b) if b.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
                Ok(FieldValue::Other(self.src[start..self.pos].to_string()))
            }
            Some(_) => {
                let name = self.identifier()?;
                Ok(FieldValue::MacroReference(name.to_ascii_lowercase()))
            }
            None => Err(self.error("expected a value but reached end of input")),
        }
    }
}

fn is_identifier_byte(b: u8) -> bool {
    !b.is_ascii_whitespace()
        && !matches!(
            b,
            b'{' | b'}' | b'(' | b')' | b',' | b'=' | b'#' | b'"' | b'@'
        )
}
