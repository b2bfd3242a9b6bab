//! CLI output formatting.
//!
//! Output leads with what the site will contain (groups and their entries)
//! and shows file names as secondary context.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Diagnostics
//!     line 12: expected '=' but found '{'
//!
//! Macros
//!     acl -> Association for Computational Linguistics
//!
//! Warnings
//!     riedel10 (journal): undefined macro `jmlr`
//!
//! Groups (by year)
//! 001 2010 (2 entries)
//!     001 Modeling Relations
//!         Details: riedel10.html
//! 002 2009 (1 entry)
//!     001 Collective Inference
//!         Details: riedel09.html
//! ```
//!
//! ## Build
//!
//! The check output, followed by
//!
//! ```text
//! Generated all.html, 3 detail pages
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::bibtex::Diagnostic;
use crate::generate::GenerateReport;
use crate::normalize::UnresolvedMacro;
use crate::site::Site;
use crate::view::GroupView;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Group header: positional index, key, entry count.
///
/// ```text
/// 001 2010 (2 entries)
/// 002 2009 (1 entry)
/// ```
fn group_header(index: usize, key: &str, count: usize) -> String {
    let noun = if count == 1 { "entry" } else { "entries" };
    format!("{} {} ({} {})", format_index(index), key, count, noun)
}

/// Push a titled section, preceded by a blank line unless it is the first.
fn push_section(lines: &mut Vec<String>, title: &str, body: Vec<String>) {
    if body.is_empty() {
        return;
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(title.to_string());
    lines.extend(body);
}

// ============================================================================
// Sections
// ============================================================================

pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| format!("{}{}", indent(1), d))
        .collect()
}

/// `key -> value` for every `@string` of the document, in source order.
pub fn format_macros(site: &Site) -> Vec<String> {
    site.document
        .macro_definitions()
        .map(|(key, _)| {
            let value = site.macros.get(key).unwrap_or_default();
            format!("{}{} -> {}", indent(1), key, value)
        })
        .collect()
}

pub fn format_warnings(unresolved: &[UnresolvedMacro]) -> Vec<String> {
    unresolved
        .iter()
        .map(|u| {
            format!(
                "{}{} ({}): undefined macro `{}`",
                indent(1),
                u.entry,
                u.field,
                u.key
            )
        })
        .collect()
}

/// Groups in render order, each entry with its detail page.
pub fn format_groups(groups: &[GroupView]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        lines.push(group_header(i + 1, &group.key, group.entries.len()));
        for (j, item) in group.entries.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(j + 1), item.title));
            lines.push(format!("{}Details: {}", indent(2), item.details));
        }
    }
    lines
}

/// Everything known about a loaded site, before anything is written.
pub fn format_site_summary(site: &Site, groups: &[GroupView]) -> Vec<String> {
    let mut lines = Vec::new();
    push_section(
        &mut lines,
        "Diagnostics",
        format_diagnostics(&site.document.diagnostics),
    );
    push_section(&mut lines, "Macros", format_macros(site));
    push_section(
        &mut lines,
        "Warnings",
        format_warnings(&site.unresolved_macros()),
    );

    let title = format!("Groups (by {})", site.config.group_by);
    let body = format_groups(groups);
    if body.is_empty() {
        push_section(&mut lines, &title, vec![format!("{}(none)", indent(1))]);
    } else {
        push_section(&mut lines, &title, body);
    }
    lines
}

/// Summary line for a finished build.
pub fn format_generate_output(report: &GenerateReport, output_dir: &Path) -> Vec<String> {
    let overview = report
        .overview
        .strip_prefix(output_dir)
        .unwrap_or(&report.overview)
        .display()
        .to_string();
    let count = report.detail_pages.len();
    let noun = if count == 1 { "page" } else { "pages" };
    vec![format!("Generated {}, {} detail {}", overview, count, noun)]
}

pub fn print_site_summary(site: &Site, groups: &[GroupView]) {
    for line in format_site_summary(site, groups) {
        println!("{}", line);
    }
}

pub fn print_generate_output(report: &GenerateReport, output_dir: &Path) {
    for line in format_generate_output(report, output_dir) {
        println!("{}", line);
    }
}
