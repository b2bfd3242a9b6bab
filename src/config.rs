//! Site configuration module.
//!
//! Handles loading, validating, and layering `bibfolio.toml`. Values come
//! from three layers, each overriding the previous one key by key:
//!
//! ```text
//! stock defaults  →  bibfolio.toml  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! group_by = "year"             # Field whose value names the groups
//! author_filter = "Riedel"      # Only entries whose authors contain this
//! expand_person_lists = false   # Split author/editor into person lists
//!
//! [pages]
//! overview = "all.html"         # Overview page file name
//! details_dir = "details"       # Directory for per-entry pages
//! preamble = "preamble.html"    # HTML fragment opening every page
//! postamble = "postamble.html"  # HTML fragment closing every page
//!
//! [authors]
//! homepages = "homepages.tsv"   # Tab-separated name → homepage file
//! ```
//!
//! Paths are used as given, relative to the working directory.
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `bibfolio.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Field used to group entries on the overview page.
    pub group_by: String,
    /// Substring an entry's author list must contain to be listed.
    pub author_filter: String,
    /// Read `author`/`editor` strings into person lists before rendering.
    pub expand_person_lists: bool,
    /// Output page settings.
    pub pages: PagesConfig,
    /// Author cross-linking settings.
    pub authors: AuthorsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            group_by: "year".to_string(),
            author_filter: "Riedel".to_string(),
            expand_person_lists: false,
            pages: PagesConfig::default(),
            authors: AuthorsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_by.trim().is_empty() {
            return Err(ConfigError::Validation("group_by must not be empty".into()));
        }
        if self.pages.overview.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pages.overview must not be empty".into(),
            ));
        }
        if self.pages.details_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pages.details_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Output page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// File name of the overview page inside the output directory.
    pub overview: String,
    /// Directory (inside the output directory) for detail pages.
    pub details_dir: String,
    /// HTML fragment written before every page body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    /// HTML fragment written after every page body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postamble: Option<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            overview: "all.html".to_string(),
            details_dir: "details".to_string(),
            preamble: None,
            postamble: None,
        }
    }
}

/// Author cross-linking settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorsConfig {
    /// Tab-separated homepage file. No links when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepages: Option<String>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file on top of stock defaults.
///
/// A missing file is not an error; the defaults are used.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Values given on the command line, applied as the last config layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub group_by: Option<String>,
    pub author_filter: Option<String>,
    pub preamble: Option<String>,
    pub postamble: Option<String>,
    pub homepages: Option<String>,
    pub expand_person_lists: bool,
}

impl Overrides {
    /// Sparse TOML table holding only the values that were given.
    pub fn to_toml(&self) -> toml::Value {
        fn put(table: &mut toml::Table, key: &str, value: &Option<String>) {
            if let Some(v) = value {
                table.insert(key.to_string(), toml::Value::String(v.clone()));
            }
        }

        let mut root = toml::Table::new();
        put(&mut root, "group_by", &self.group_by);
        put(&mut root, "author_filter", &self.author_filter);
        if self.expand_person_lists {
            root.insert("expand_person_lists".into(), toml::Value::Boolean(true));
        }

        let mut pages = toml::Table::new();
        put(&mut pages, "preamble", &self.preamble);
        put(&mut pages, "postamble", &self.postamble);
        if !pages.is_empty() {
            root.insert("pages".into(), toml::Value::Table(pages));
        }

        let mut authors = toml::Table::new();
        put(&mut authors, "homepages", &self.homepages);
        if !authors.is_empty() {
            root.insert("authors".into(), toml::Value::Table(authors));
        }

        toml::Value::Table(root)
    }
}

/// Stock defaults, then the config file (if present), then overrides.
pub fn load_config_with(path: &Path, overrides: &Overrides) -> Result<SiteConfig, ConfigError> {
    let file = load_raw_config(path)?;
    resolve_config(
        stock_defaults_value(),
        file.into_iter().chain(Some(overrides.to_toml())),
    )
}

/// Returns a fully-commented stock `bibfolio.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bibfolio configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--group-by, --author, --preamble, --postamble,
# --homepages, --expand-person-lists) override the values in this file.
# Unknown keys will cause an error.

# Field whose value names the groups on the overview page. Comma-separated
# values (e.g. keywords) put an entry into several groups. Groups are listed
# in descending string order, so years appear newest first.
group_by = "year"

# Only entries whose author list contains this text are listed. Entries
# without a year are always left out.
author_filter = "Riedel"

# Read author and editor fields into person lists ("Last, First" or
# "First Last" per name) instead of using them as plain text.
expand_person_lists = false

# ---------------------------------------------------------------------------
# Output pages
# ---------------------------------------------------------------------------
[pages]
# Overview page, written to the output directory.
overview = "all.html"

# Directory for one detail page per entry.
details_dir = "details"

# HTML fragments wrapped around every page. Without them a minimal
# <html><body> shell is used.
# preamble = "preamble.html"
# postamble = "postamble.html"

# ---------------------------------------------------------------------------
# Authors
# ---------------------------------------------------------------------------
[authors]
# Tab-separated file: name<TAB>other spelling<TAB>...<TAB>url
# Listed names are linked to their homepage wherever they appear.
# homepages = "homepages.tsv"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.group_by, "year");
        assert_eq!(config.author_filter, "Riedel");
        assert!(!config.expand_person_lists);
        assert_eq!(config.pages.overview, "all.html");
        assert_eq!(config.pages.details_dir, "details");
        assert_eq!(config.pages.preamble, None);
        assert_eq!(config.authors.homepages, None);
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str(r#"group_by = "keywords""#).unwrap();
        assert_eq!(config.group_by, "keywords");
        assert_eq!(config.author_filter, "Riedel");
        assert_eq!(config.pages.overview, "all.html");
    }

    #[test]
    fn parse_page_fragments() {
        let toml = r#"
[pages]
preamble = "head.html"
postamble = "foot.html"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.pages.preamble.as_deref(), Some("head.html"));
        assert_eq!(config.pages.postamble.as_deref(), Some("foot.html"));
        assert_eq!(config.pages.details_dir, "details");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("bibfolio.toml")).unwrap();
        assert_eq!(config.group_by, "year");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bibfolio.toml");
        fs::write(
            &path,
            r#"
author_filter = "McCallum"

[authors]
homepages = "people.tsv"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.author_filter, "McCallum");
        assert_eq!(config.authors.homepages.as_deref(), Some("people.tsv"));
        assert_eq!(config.group_by, "year");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bibfolio.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bibfolio.toml");
        fs::write(&path, r#"group_by = "  ""#).unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml / resolve_config tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[pages]
overview = "all.html"
details_dir = "details"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[pages]
overview = "index.html"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let pages = merged.get("pages").unwrap();
        assert_eq!(pages.get("overview").unwrap().as_str(), Some("index.html"));
        assert_eq!(pages.get("details_dir").unwrap().as_str(), Some("details"));
    }

    #[test]
    fn resolve_config_applies_overlays_in_order() {
        let file: toml::Value = toml::from_str(
            r#"
group_by = "keywords"
author_filter = "Doe"
"#,
        )
        .unwrap();
        let flags: toml::Value = toml::from_str(r#"author_filter = "Riedel""#).unwrap();
        let config = resolve_config(stock_defaults_value(), [file, flags]).unwrap();
        assert_eq!(config.group_by, "keywords");
        assert_eq!(config.author_filter, "Riedel");
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value(), None::<toml::Value>).unwrap();
        assert_eq!(config.pages.overview, "all.html");
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str(
            r#"
[pages]
details_dir = ""
"#,
        )
        .unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Overrides tests
    // =========================================================================

    #[test]
    fn empty_overrides_change_nothing() {
        let overrides = Overrides::default();
        assert_eq!(overrides.to_toml(), toml::Value::Table(toml::Table::new()));
    }

    #[test]
    fn overrides_win_over_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bibfolio.toml");
        fs::write(
            &path,
            r#"
group_by = "keywords"
author_filter = "Doe"

[pages]
overview = "index.html"
preamble = "file-pre.html"
"#,
        )
        .unwrap();

        let overrides = Overrides {
            author_filter: Some("Riedel".into()),
            preamble: Some("cli-pre.html".into()),
            homepages: Some("people.tsv".into()),
            expand_person_lists: true,
            ..Overrides::default()
        };
        let config = load_config_with(&path, &overrides).unwrap();
        assert_eq!(config.group_by, "keywords");
        assert_eq!(config.author_filter, "Riedel");
        assert_eq!(config.pages.overview, "index.html");
        assert_eq!(config.pages.preamble.as_deref(), Some("cli-pre.html"));
        assert_eq!(config.authors.homepages.as_deref(), Some("people.tsv"));
        assert!(config.expand_person_lists);
    }

    #[test]
    fn overrides_apply_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let overrides = Overrides {
            group_by: Some("month".into()),
            ..Overrides::default()
        };
        let config = load_config_with(&tmp.path().join("none.toml"), &overrides).unwrap();
        assert_eq!(config.group_by, "month");
        assert_eq!(config.author_filter, "Riedel");
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(r#"group = "year""#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let toml_str = r#"
[pages]
overveiw = "all.html"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.group_by, defaults.group_by);
        assert_eq!(config.author_filter, defaults.author_filter);
        assert_eq!(config.expand_person_lists, defaults.expand_person_lists);
        assert_eq!(config.pages.overview, defaults.pages.overview);
        assert_eq!(config.pages.details_dir, defaults.pages.details_dir);
        assert_eq!(config.pages.preamble, None);
        assert_eq!(config.authors.homepages, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("pages").is_some());
        assert!(val.get("authors").is_some());
        assert!(val.get("pages").unwrap().get("preamble").is_none());
    }
}
