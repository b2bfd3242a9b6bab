//! Shared test utilities for the bibfolio test suite.
//!
//! Provides entry builders, lookup helpers, and bulk extractors that work
//! with parsed and grouped data (`Document`, `Entry`, `Group`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let entries = vec![
//!     paper("a", "Sebastian Riedel", "2010", "One"),
//!     entry("b", &[("author", "Jane Doe"), ("year", "2009")]),
//! ];
//! let groups = group(&entries, "year", "Riedel", &MacroTable::default());
//! assert_eq!(group_keys(&groups), vec!["2010"]);
//! assert_eq!(entry_keys(&groups["2010"]), vec!["a"]);
//! ```

use indexmap::IndexMap;

use crate::bibtex::Document;
use crate::types::{Entry, FieldValue};
use crate::view::Group;

// =========================================================================
// Builders
// =========================================================================

pub fn leaf(text: &str) -> FieldValue {
    FieldValue::leaf(text)
}

/// A `misc` entry with the given fields as plain text.
pub fn entry(key: &str, fields: &[(&str, &str)]) -> Entry {
    fields
        .iter()
        .fold(Entry::new(key, "misc"), |e, (name, value)| {
            e.with_field(*name, leaf(value))
        })
}

/// An `inproceedings` entry with author, year, and title.
pub fn paper(key: &str, author: &str, year: &str, title: &str) -> Entry {
    Entry::new(key, "inproceedings")
        .with_field("author", leaf(author))
        .with_field("year", leaf(year))
        .with_field("title", leaf(title))
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find an entry by citation key. Panics if not found.
pub fn find_entry<'a>(document: &'a Document, key: &str) -> &'a Entry {
    document
        .entries()
        .find(|e| e.key == key)
        .unwrap_or_else(|| {
            let keys: Vec<&str> = document.entries().map(|e| e.key.as_str()).collect();
            panic!("entry '{key}' not found. Available: {keys:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Group keys in map order.
pub fn group_keys<'a>(groups: &'a IndexMap<String, Vec<&Entry>>) -> Vec<&'a str> {
    groups.keys().map(|k| k.as_str()).collect()
}

/// Citation keys in order.
pub fn entry_keys<'a>(entries: &[&'a Entry]) -> Vec<&'a str> {
    entries.iter().map(|e| e.key.as_str()).collect()
}

/// Group keys of assembled groups, in render order.
pub fn assembled_keys<'a>(groups: &'a [Group<'_>]) -> Vec<&'a str> {
    groups.iter().map(|g| g.key.as_str()).collect()
}
