//! # bibfolio
//!
//! A minimal static site generator for publication lists. Your BibTeX file is
//! the data source: entries become items on an overview page, grouped by a
//! field of your choice, and each entry gets a detail page with its source.
//!
//! # Architecture: Linear Pipeline
//!
//! ```text
//! .bib  →  bibtex::parse  →  Document            (records + diagnostics)
//!       →  MacroTable::from_document              (@string values, resolved once)
//!       →  select::group                          (author/year filter, split on ',')
//!       →  view::assemble                         (keys descending, entries by sort key,
//!                                                  render-time filter)
//!       →  generate                               (all.html + details/<key>.html)
//! ```
//!
//! Every stage after parsing is a pure function over immutable inputs. The
//! macro table and the homepage table are built once in [`site::Site::load`]
//! and passed by reference, so each stage is testable in isolation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `FieldValue`, `Person`, `Entry` |
//! | [`bibtex`] | Best-effort `.bib` reader producing records and diagnostics |
//! | [`normalize`] | `FieldValue` → display string, macro table, TeX accents |
//! | [`authors`] | `" and "` → `", "`, homepage table, author links |
//! | [`select`] | Entry filters, grouping, intra-group sort keys |
//! | [`view`] | Ordered render model and its serializable views |
//! | [`site`] | Loads the bibliography and all side files up front |
//! | [`generate`] | Renders the HTML pages using Maud |
//! | [`config`] | `bibfolio.toml` loading, layering, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lossy Normalization
//!
//! Field values are flattened for display: braces are dropped and a fixed
//! table of TeX accent commands is substituted. This is not a TeX
//! interpreter; anything outside the table passes through untouched.
//!
//! ## Two Filters
//!
//! Group membership is decided by the author/year check. When a group is
//! rendered, each entry is checked again, this time also requiring a title
//! that is not a bare link. A group can therefore render with fewer entries
//! than it was built with, or with only its heading.
//!
//! ## Plain String Ordering
//!
//! Group keys are sorted as strings and reversed. Four-digit years come out
//! newest first; nothing else is interpreted numerically.

pub mod authors;
pub mod bibtex;
pub mod config;
pub mod generate;
pub mod normalize;
pub mod output;
pub mod select;
pub mod site;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
