//! Entry selection, grouping, and intra-group sort keys.
//!
//! Two filters exist on purpose:
//!
//! - [`qualifies`] decides group membership (author match and a year).
//! - [`renderable`] is re-checked per entry when a group is rendered and
//!   additionally requires a title that is not just a link.
//!
//! Group membership is computed once with the first; the second runs
//! independently in [`crate::view::assemble`].

use crate::authors::prettify;
use crate::normalize::{MacroTable, NOT_AVAILABLE, normalize};
use crate::types::Entry;
use indexmap::IndexMap;

/// Month spellings and their two-digit codes. Lookups are lowercase.
const MONTHS: &[(&str, &str)] = &[
    ("1", "01"),
    ("2", "02"),
    ("3", "03"),
    ("4", "04"),
    ("5", "05"),
    ("6", "06"),
    ("7", "07"),
    ("8", "08"),
    ("9", "09"),
    ("january", "01"),
    ("february", "02"),
    ("march", "03"),
    ("april", "04"),
    ("may", "05"),
    ("june", "06"),
    ("july", "07"),
    ("august", "08"),
    ("september", "09"),
    ("october", "10"),
    ("november", "11"),
    ("december", "12"),
];

/// Does the entry belong on the page at all?
///
/// True iff the prettified author list contains `author_filter` and the
/// entry has a year.
pub fn qualifies(entry: &Entry, author_filter: &str, macros: &MacroTable) -> bool {
    let author = prettify(&normalize(entry.field("author"), macros));
    let year = normalize(entry.field("year"), macros);
    author.contains(author_filter) && year != NOT_AVAILABLE
}

/// Render-time check: a title is present, [`qualifies`] still holds, and the
/// title is not a bare link placeholder.
pub fn renderable(entry: &Entry, author_filter: &str, macros: &MacroTable) -> bool {
    let Some(title) = entry.field("title") else {
        return false;
    };
    qualifies(entry, author_filter, macros) && !normalize(Some(title), macros).contains("http")
}

/// Key used to order entries inside one group.
///
/// The month as a two-digit code when it can be mapped, the trimmed
/// lowercase month text when it cannot, and the title when there is no
/// month at all.
pub fn sort_key(entry: &Entry, macros: &MacroTable) -> String {
    match entry.field("month") {
        Some(month) => {
            let month = normalize(Some(month), macros).trim().to_lowercase();
            MONTHS
                .iter()
                .find(|(name, _)| *name == month)
                .map(|(_, code)| code.to_string())
                .unwrap_or(month)
        }
        None => normalize(entry.field("title"), macros),
    }
}

/// Partition qualifying entries by the normalized value of `field`.
///
/// Values are split on `,` without trimming, so `"ml, nlp"` yields the
/// groups `"ml"` and `" nlp"`. Entries lacking the field are skipped.
/// Group order and entry order follow first appearance.
pub fn group<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    field: &str,
    author_filter: &str,
    macros: &MacroTable,
) -> IndexMap<String, Vec<&'a Entry>> {
    let mut groups: IndexMap<String, Vec<&'a Entry>> = IndexMap::new();
    for entry in entries {
        if !qualifies(entry, author_filter, macros) {
            continue;
        }
        let Some(value) = entry.field(field) else {
            continue;
        };
        for key in normalize(Some(value), macros).split(',') {
            groups.entry(key.to_string()).or_default().push(entry);
        }
    }
    groups
}
