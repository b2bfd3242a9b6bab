//! HTML site generation.
//!
//! Renders the assembled groups of a [`Site`] into static pages.
//!
//! ## Generated Pages
//!
//! - **Overview page** (`/all.html`): group index followed by every group
//!   with its entries
//! - **Detail pages** (`/details/{key}.html`): one entry with its BibTeX
//!   source, written once per entry even when it appears in several groups.
//!   Keys are percent-encoded in file names and again in links, so `a/b`
//!   lives in `a%2Fb.html` and is linked as `details/a%252Fb.html`
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── all.html
//! └── details/
//!     ├── riedel10.html
//!     └── riedel09.html
//! ```
//!
//! ## Page Shell
//!
//! Every page is `preamble + body + postamble`. The fragments are inserted
//! verbatim, so they can carry the site's own `<head>`, styles, and
//! navigation. Everything else is generated with [maud](https://maud.lambda.xyz/)
//! and auto-escaped.
//!
//! ## Markup Classes
//!
//! `grouplist`/`groupref` for the index, `publist`/`group`/`grouptitle`/
//! `itemlist`/`pubitem` for the listing, and `title`, `author`, `note`,
//! `year` plus the venue field name (`booktitle`, `journal`,
//! `howpublished`, `school`) for the parts of an entry.

use crate::authors::{HomepageTable, linkify};
use crate::normalize::{MacroTable, normalize};
use crate::site::Site;
use crate::types::Entry;
use crate::view::{EntryView, GroupView, encode_component, group_views};
use maud::{Markup, PreEscaped, html};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What [`generate`] wrote.
#[derive(Debug)]
pub struct GenerateReport {
    pub overview: PathBuf,
    pub groups: Vec<GroupView>,
    pub detail_pages: Vec<PathBuf>,
}

pub fn generate(site: &Site, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let groups = site.groups();
    let views = group_views(&groups, &site.macros);

    let details_dir = output_dir.join(&site.config.pages.details_dir);
    fs::create_dir_all(&details_dir)?;

    let mut written = HashSet::new();
    let mut detail_pages = Vec::new();
    for (group, view) in groups.iter().zip(&views) {
        for (entry, item) in group.entries.iter().zip(&view.entries) {
            if !written.insert(entry.key.as_str()) {
                continue;
            }
            let path = details_dir.join(&item.details);
            fs::write(&path, render_detail_page(site, entry, item).into_string())?;
            detail_pages.push(path);
        }
    }

    let overview = output_dir.join(&site.config.pages.overview);
    fs::write(&overview, render_overview(site, &views).into_string())?;

    Ok(GenerateReport {
        overview,
        groups: views,
        detail_pages,
    })
}

/// `@type{key,` + one `    field={value},` line per field + `}`.
///
/// Fields starting with `date` or `url` are left out. Values are written
/// normalized, so braces and TeX accents do not survive the round trip.
pub fn bibtex_source(entry: &Entry, macros: &MacroTable) -> String {
    let mut out = format!("@{}{{{},\n", entry.entry_type, entry.key);
    for (name, value) in &entry.fields {
        if name.starts_with("date") || name.starts_with("url") {
            continue;
        }
        out.push_str(&format!("    {}={{{}}},\n", name, normalize(Some(value), macros)));
    }
    out.push('}');
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Wraps page content in the configured preamble and postamble.
fn page_shell(site: &Site, content: Markup) -> Markup {
    html! {
        (PreEscaped(site.preamble.as_str()))
        (content)
        (PreEscaped(site.postamble.as_str()))
    }
}

/// Renders one entry: title, linked authors, venue, note, year, pdf link.
fn bib_item(item: &EntryView, homepages: &HomepageTable, author_filter: &str) -> Markup {
    html! {
        span.title { (item.title) } ", "
        span.author { (linkify(&item.author, homepages, author_filter)) } ", "
        @if let Some(venue) = &item.venue {
            span class=(venue.field) { (venue.text) } " "
        }
        @if let Some(note) = &item.note {
            span.note { (note) } " "
        }
        span.year { (item.year) }
        @if let Some(url) = &item.url {
            " [" a href=(url) { "pdf" } "]"
        }
    }
}

/// Relative link from the overview to a detail page, each path segment
/// percent-encoded.
fn detail_href(details_dir: &str, file_name: &str) -> String {
    details_dir
        .split('/')
        .chain(std::iter::once(file_name))
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the overview page: group index, then the grouped listing.
fn render_overview(site: &Site, groups: &[GroupView]) -> Markup {
    let details_dir = site.config.pages.details_dir.as_str();
    let content = html! {
        ul.grouplist {
            @for group in groups {
                li.groupref { a href={ "#" (encode_component(&group.key)) } { (group.key) } }
            }
        }
        ul.publist {
            @for group in groups {
                li.group {
                    a name=(group.key) { span.grouptitle { (group.key) } }
                    ul.itemlist {
                        @for item in &group.entries {
                            li.pubitem {
                                (bib_item(item, &site.homepages, &site.config.author_filter))
                                " [" a href=(detail_href(details_dir, &item.details)) { "details" } "]"
                            }
                        }
                    }
                }
            }
        }
    };
    page_shell(site, content)
}

/// Renders a detail page: the entry followed by its BibTeX source.
fn render_detail_page(site: &Site, entry: &Entry, item: &EntryView) -> Markup {
    let content = html! {
        div.pubitem {
            (bib_item(item, &site.homepages, &site.config.author_filter))
        }
        blockquote {
            pre { (bibtex_source(entry, &site.macros)) }
        }
    };
    page_shell(site, content)
}

// ============================================================================
// Tests
// ============================================================================
