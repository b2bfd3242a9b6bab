//! Loading everything a build needs, once, up front.
//!
//! A [`Site`] owns the parsed document and the read-only lookup tables
//! derived from it. Nothing in it changes after [`Site::load`]; grouping and
//! rendering only borrow from it.

use crate::authors::{HomepageTable, load_homepages};
use crate::bibtex::{self, Document};
use crate::config::SiteConfig;
use crate::normalize::{MacroTable, UnresolvedMacro, unresolved_macros};
use crate::select::group;
use crate::view::{Group, GroupView, assemble, group_views};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PREAMBLE: &str = "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>Publications</title></head><body>";
pub const DEFAULT_POSTAMBLE: &str = "</body></html>";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn read(path: &Path) -> Result<String, SiteError> {
    fs::read_to_string(path).map_err(|source| SiteError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    pub document: Document,
    pub macros: MacroTable,
    pub homepages: HomepageTable,
    pub preamble: String,
    pub postamble: String,
}

impl Site {
    /// Read the bibliography and every file the config points at.
    ///
    /// Syntax problems in the bibliography are kept as diagnostics; missing
    /// or unreadable files are errors.
    pub fn load(bib_path: &Path, config: SiteConfig) -> Result<Self, SiteError> {
        let source = read(bib_path)?;
        let mut site = Self::from_document(bibtex::parse(&source), config);

        if let Some(path) = &site.config.authors.homepages {
            let path = Path::new(path);
            site.homepages = load_homepages(path).map_err(|source| SiteError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        }
        if let Some(path) = &site.config.pages.preamble {
            site.preamble = read(Path::new(path))?;
        }
        if let Some(path) = &site.config.pages.postamble {
            site.postamble = read(Path::new(path))?;
        }
        Ok(site)
    }

    /// Build a site from an already parsed document, with no homepages and
    /// the default page shell.
    pub fn from_document(document: Document, config: SiteConfig) -> Self {
        let document = if config.expand_person_lists {
            document.expand_person_lists()
        } else {
            document
        };
        let macros = MacroTable::from_document(&document);
        Self {
            config,
            document,
            macros,
            homepages: HomepageTable::default(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            postamble: DEFAULT_POSTAMBLE.to_string(),
        }
    }

    /// Qualifying entries grouped, ordered, and render-filtered.
    pub fn groups(&self) -> Vec<Group<'_>> {
        let filter = &self.config.author_filter;
        let grouped = group(
            self.document.entries(),
            &self.config.group_by,
            filter,
            &self.macros,
        );
        assemble(grouped, filter, &self.macros)
    }

    pub fn view(&self) -> Vec<GroupView> {
        group_views(&self.groups(), &self.macros)
    }

    pub fn unresolved_macros(&self) -> Vec<UnresolvedMacro> {
        unresolved_macros(&self.document, &self.macros)
    }
}
