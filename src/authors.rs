//! Author list formatting and homepage cross-links.
//!
//! ## Homepage File
//!
//! An optional tab-separated file maps people to their homepages. Every
//! column but the last is a name, the last column is the URL:
//!
//! ```text
//! Sebastian Riedel	S. Riedel	http://example.org/~riedel
//! Andrew McCallum	http://example.org/~mccallum
//! ```
//!
//! Each name is registered as written and in its reversed `Last, First`
//! form, so both spellings found in BibTeX author fields get linked.

use maud::{Markup, html};
use std::fs;
use std::path::Path;

/// Turn `"A and B and C"` into `"A, B, C"`.
///
/// Replaces the leftmost separator one at a time until none is left.
pub fn prettify(author: &str) -> String {
    let mut result = author.to_string();
    while let Some(pos) = result.find(" and ") {
        result.replace_range(pos..pos + " and ".len(), ", ");
    }
    result
}

/// Name → homepage URL, in file order.
#[derive(Debug, Clone, Default)]
pub struct HomepageTable {
    urls: indexmap::IndexMap<String, String>,
}

impl HomepageTable {
    /// Parse the tab-separated homepage format.
    ///
    /// Blank lines and lines with fewer than two columns are ignored.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        for line in text.lines() {
            let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
            let Some((url, names)) = columns.split_last() else {
                continue;
            };
            if names.is_empty() || url.is_empty() {
                continue;
            }
            for name in names.iter().filter(|n| !n.is_empty()) {
                table.insert(name, url);
                if let Some(reversed) = reversed_name(name) {
                    table.insert(&reversed, url);
                }
            }
        }
        table
    }

    pub fn insert(&mut self, name: &str, url: &str) {
        self.urls.insert(name.to_string(), url.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Read a homepage file. Any I/O failure is returned to the caller.
pub fn load_homepages(path: &Path) -> std::io::Result<HomepageTable> {
    let content = fs::read_to_string(path)?;
    Ok(HomepageTable::parse(&content))
}

/// `"Sebastian Riedel"` → `"Riedel, Sebastian"`. Single words have no
/// reversed form.
fn reversed_name(name: &str) -> Option<String> {
    let (rest, last) = name.rsplit_once(' ')?;
    Some(format!("{last}, {rest}"))
}

enum Segment<'a> {
    Text(String),
    Link { name: &'a str, url: &'a str },
}

/// Link known names inside an author string.
///
/// For each table entry in order, the first occurrence of the name in text
/// that is not already linked becomes an anchor. Names containing
/// `filter_name` are italicized. Plain text is HTML-escaped.
pub fn linkify(author: &str, homepages: &HomepageTable, filter_name: &str) -> Markup {
    let mut segments = vec![Segment::Text(author.to_string())];

    for (name, url) in homepages.iter() {
        if name.is_empty() {
            continue;
        }
        let found = segments.iter().enumerate().find_map(|(idx, segment)| match segment {
            Segment::Text(text) => text.find(name).map(|pos| (idx, pos)),
            Segment::Link { .. } => None,
        });
        let Some((idx, pos)) = found else {
            continue;
        };
        let Segment::Text(text) = &segments[idx] else {
            continue;
        };
        let before = text[..pos].to_string();
        let after = text[pos + name.len()..].to_string();
        let tail = segments.split_off(idx + 1);
        segments.truncate(idx);
        segments.push(Segment::Text(before));
        segments.push(Segment::Link { name, url });
        segments.push(Segment::Text(after));
        segments.extend(tail);
    }

    html! {
        @for segment in &segments {
            @match segment {
                Segment::Text(text) => { (text) }
                Segment::Link { name, url } => {
                    a href=(url) {
                        @if name.contains(filter_name) {
                            i { (name) }
                        } @else {
                            (name)
                        }
                    }
                }
            }
        }
    }
}
