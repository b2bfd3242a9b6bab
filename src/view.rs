//! The ordered, grouped render model.
//!
//! [`assemble`] takes the groups produced by [`crate::select::group`] and
//! fixes the final order: group keys descending (plain string order, so
//! years come out newest first), entries ascending by
//! [`crate::select::sort_key`]. The render-time filter runs here, after
//! sorting, so a group can end up with fewer entries than it was built with
//! or none at all; its heading is kept either way.
//!
//! [`EntryView`] holds the display strings for one rendered entry. The HTML
//! templates and the `view` JSON dump both read from it.

use crate::authors::prettify;
use crate::normalize::{MacroTable, normalize};
use crate::select::{renderable, sort_key};
use crate::types::Entry;
use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

/// A group ready for rendering.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub key: String,
    pub entries: Vec<&'a Entry>,
}

/// Order groups and their entries, then apply the render-time filter.
pub fn assemble<'a>(
    groups: IndexMap<String, Vec<&'a Entry>>,
    author_filter: &str,
    macros: &MacroTable,
) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = groups
        .into_iter()
        .map(|(key, entries)| Group { key, entries })
        .collect();
    groups.sort_by(|a, b| b.key.cmp(&a.key));

    for group in &mut groups {
        group.entries.sort_by_cached_key(|e| sort_key(e, macros));
        group
            .entries
            .retain(|e| renderable(e, author_filter, macros));
    }
    groups
}

/// The venue line of an entry, chosen by entry type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Venue {
    /// Source field name, also used as the CSS class.
    pub field: &'static str,
    pub text: String,
}

/// Entry-type prefix → venue field.
const VENUE_FIELDS: &[(&str, &str)] = &[
    ("inproceedings", "booktitle"),
    ("article", "journal"),
    ("misc", "howpublished"),
    ("phdthesis", "school"),
];

/// Display strings for one entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub key: String,
    pub entry_type: String,
    pub title: String,
    /// Normalized and prettified, not yet linkified.
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub sort_key: String,
    /// File name of the detail page, relative to the details directory.
    pub details: String,
}

impl EntryView {
    pub fn new(entry: &Entry, macros: &MacroTable) -> Self {
        let venue = VENUE_FIELDS
            .iter()
            .find(|(prefix, _)| entry.entry_type.starts_with(prefix))
            .map(|&(_, field)| Venue {
                field,
                text: normalize(entry.field(field), macros),
            });

        Self {
            key: entry.key.clone(),
            entry_type: entry.entry_type.clone(),
            title: normalize(entry.field("title"), macros),
            author: prettify(&normalize(entry.field("author"), macros)),
            venue,
            note: entry.field("note").map(|v| normalize(Some(v), macros)),
            year: normalize(entry.field("year"), macros),
            url: entry.field("url").map(|v| normalize(Some(v), macros)),
            sort_key: sort_key(entry, macros),
            details: detail_filename(&entry.key),
        }
    }
}

/// A group as serialized by the `view` command.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub key: String,
    pub entries: Vec<EntryView>,
}

pub fn group_views(groups: &[Group<'_>], macros: &MacroTable) -> Vec<GroupView> {
    groups
        .iter()
        .map(|g| GroupView {
            key: g.key.clone(),
            entries: g.entries.iter().map(|e| EntryView::new(e, macros)).collect(),
        })
        .collect()
}

/// Bytes kept as-is in file names and link targets. Everything else, `%`
/// included, becomes `%XX`, so the encoding is reversible and two keys never
/// share a file name.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode a single path segment or URL fragment.
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, PATH_SAFE).to_string()
}

/// `"riedel10"` → `"riedel10.html"`, `"a/b"` → `"a%2Fb.html"`. Every key
/// stays inside the details directory and gets a file of its own.
pub fn detail_filename(key: &str) -> String {
    format!("{}.html", encode_component(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::group;
    use crate::test_helpers::*;

    fn two_papers() -> Vec<Entry> {
        vec![
            entry(
                "one",
                &[
                    ("author", "Jane Doe and Sebastian Riedel"),
                    ("year", "2010"),
                    ("month", "june"),
                    ("title", "Paper One"),
                ],
            ),
            entry(
                "two",
                &[
                    ("author", "Sebastian Riedel"),
                    ("year", "2009"),
                    ("title", "Paper Two"),
                ],
            ),
        ]
    }

    #[test]
    fn end_to_end_two_entries() {
        let macros = MacroTable::default();
        let entries = two_papers();
        let groups = assemble(group(&entries, "year", "Riedel", &macros), "Riedel", &macros);

        assert_eq!(assembled_keys(&groups), vec!["2010", "2009"]);
        assert_eq!(sort_key(groups[0].entries[0], &macros), "06");
        assert_eq!(sort_key(groups[1].entries[0], &macros), "Paper Two");
    }

    #[test]
    fn group_keys_descend_as_strings() {
        let macros = MacroTable::default();
        let entries = vec![
            paper("a", "Riedel", "2009", "A"),
            paper("b", "Riedel", "2011", "B"),
            paper("c", "Riedel", "10", "C"),
            paper("d", "Riedel", "2010", "D"),
        ];
        let groups = assemble(group(&entries, "year", "Riedel", &macros), "Riedel", &macros);
        assert_eq!(assembled_keys(&groups), vec!["2011", "2010", "2009", "10"]);
    }

    #[test]
    fn entries_sorted_by_key_with_stable_ties() {
        let macros = MacroTable::default();
        let entries = vec![
            paper("late", "Riedel", "2010", "Zeta").with_field("month", leaf("November")),
            paper("tie-1", "Riedel", "2010", "Beta").with_field("month", leaf("3")),
            paper("early", "Riedel", "2010", "Alpha").with_field("month", leaf("January")),
            paper("tie-2", "Riedel", "2010", "Aardvark").with_field("month", leaf("march")),
        ];
        let groups = assemble(group(&entries, "year", "Riedel", &macros), "Riedel", &macros);
        assert_eq!(
            entry_keys(&groups[0].entries),
            vec!["early", "tie-1", "tie-2", "late"]
        );
    }

    #[test]
    fn render_filter_drops_link_titles_but_keeps_group() {
        let macros = MacroTable::default();
        let entries = vec![
            paper("slides", "Riedel", "2012", "http://example.org/slides.pdf"),
            paper("real", "Riedel", "2011", "A Real Paper"),
            entry("untitled", &[("author", "Riedel"), ("year", "2011")]),
        ];
        let grouped = group(&entries, "year", "Riedel", &macros);
        assert_eq!(grouped["2011"].len(), 2);

        let groups = assemble(grouped, "Riedel", &macros);
        assert_eq!(assembled_keys(&groups), vec!["2012", "2011"]);
        assert!(groups[0].entries.is_empty());
        assert_eq!(entry_keys(&groups[1].entries), vec!["real"]);
    }

    #[test]
    fn entry_view_picks_venue_by_type() {
        let macros = MacroTable::default();
        let e = Entry::new("k", "inproceedings")
            .with_field("title", leaf("T"))
            .with_field("author", leaf("A and B"))
            .with_field("booktitle", leaf("Proc. {ACL}"))
            .with_field("year", leaf("2010"));
        let view = EntryView::new(&e, &macros);
        assert_eq!(view.author, "A, B");
        assert_eq!(
            view.venue,
            Some(Venue {
                field: "booktitle",
                text: "Proc. ACL".into()
            })
        );
        assert_eq!(view.note, None);
        assert_eq!(view.url, None);
        assert_eq!(view.details, "k.html");
    }

    #[test]
    fn entry_view_missing_venue_field_is_not_available() {
        let macros = MacroTable::default();
        let e = Entry::new("k", "article").with_field("title", leaf("T"));
        let view = EntryView::new(&e, &macros);
        assert_eq!(view.venue.unwrap().text, "N/A");
        assert_eq!(view.year, "N/A");
    }

    #[test]
    fn entry_view_other_types_have_no_venue() {
        let macros = MacroTable::default();
        let e = Entry::new("k", "techreport")
            .with_field("note", leaf("Draft"))
            .with_field("url", leaf("http://x.org/p.pdf"));
        let view = EntryView::new(&e, &macros);
        assert_eq!(view.venue, None);
        assert_eq!(view.note.as_deref(), Some("Draft"));
        assert_eq!(view.url.as_deref(), Some("http://x.org/p.pdf"));
    }

    #[test]
    fn group_views_serialize_to_json() {
        let macros = MacroTable::default();
        let entries = two_papers();
        let groups = assemble(group(&entries, "year", "Riedel", &macros), "Riedel", &macros);
        let json = serde_json::to_value(group_views(&groups, &macros)).unwrap();
        assert_eq!(json[0]["key"], "2010");
        assert_eq!(json[0]["entries"][0]["author"], "Jane Doe, Sebastian Riedel");
        assert_eq!(json[1]["entries"][0]["sort_key"], "Paper Two");
        assert!(json[1]["entries"][0].get("url").is_none());
    }

    #[test]
    fn detail_filename_encodes_separators() {
        assert_eq!(detail_filename("riedel10"), "riedel10.html");
        assert_eq!(detail_filename("doe-2010_b.v2"), "doe-2010_b.v2.html");
        assert_eq!(detail_filename("a/b\\c"), "a%2Fb%5Cc.html");
        assert_eq!(detail_filename("riedel:10"), "riedel%3A10.html");
    }

    #[test]
    fn detail_filenames_never_collide() {
        let keys = ["a/b", "a_b", "a%2Fb", "a b", "a+b"];
        let mut names: Vec<String> = keys.iter().map(|k| detail_filename(k)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), keys.len());
        assert_eq!(detail_filename("a%2Fb"), "a%252Fb.html");
    }

    #[test]
    fn encode_component_escapes_link_syntax() {
        assert_eq!(encode_component(" nlp"), "%20nlp");
        assert_eq!(encode_component("c#?"), "c%23%3F");
        assert_eq!(encode_component("Müller"), "M%C3%BCller");
    }
}
