//! Shared bibliographic types.
//!
//! The reader in [`crate::bibtex`] produces these; everything downstream
//! (normalization, grouping, rendering) only reads them.

use indexmap::IndexMap;

/// A typed field value as it appears in the `.bib` source.
///
/// Values form a plain ownership tree: concatenations own their halves and
/// macro references are resolved by key at normalization time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A braced or quoted string, inner braces preserved.
    Leaf(String),
    /// Two values joined with `#`.
    Concatenation(Box<FieldValue>, Box<FieldValue>),
    /// Names split out of an `author` or `editor` field.
    PersonList(Vec<Person>),
    /// A bare identifier referring to an `@string` macro (lowercased).
    MacroReference(String),
    /// Any other raw token, e.g. an unquoted number.
    Other(String),
}

impl FieldValue {
    pub fn leaf(text: impl Into<String>) -> Self {
        FieldValue::Leaf(text.into())
    }

    pub fn concat(left: FieldValue, right: FieldValue) -> Self {
        FieldValue::Concatenation(Box::new(left), Box::new(right))
    }
}

/// One name in a person list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub first: String,
    pub last: String,
}

impl Person {
    /// True when neither name part carries any text.
    pub fn is_empty(&self) -> bool {
        self.first.trim().is_empty() && self.last.trim().is_empty()
    }

    /// `"First Last"`, or whichever part is present.
    pub fn display_name(&self) -> String {
        match (self.first.trim(), self.last.trim()) {
            ("", last) => last.to_string(),
            (first, "") => first.to_string(),
            (first, last) => format!("{first} {last}"),
        }
    }
}

/// A single bibliographic record such as `@article{key, ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Citation key, case preserved.
    pub key: String,
    /// Lowercased entry type (`article`, `inproceedings`, ...).
    pub entry_type: String,
    /// Lowercased field name to value, in source order.
    pub fields: IndexMap<String, FieldValue>,
}

impl Entry {
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion, mostly for tests and fixtures.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
