//! Flattening typed field values into display strings.
//!
//! [`normalize`] is the single place where a [`FieldValue`] tree becomes
//! text. It is a pure function of the value and a [`MacroTable`] snapshot:
//!
//! | Value | Result |
//! |-------|--------|
//! | missing | `"N/A"` |
//! | `Leaf` / `Other` | braces stripped, TeX accents substituted |
//! | `Concatenation` | both halves joined with a single space |
//! | `PersonList` | `"First Last"` per person, joined with `", "` |
//! | `MacroReference` | the macro's value, or `"N/A"` if undefined |
//!
//! Undefined macros are not errors. [`unresolved_macros`] lists them so the
//! CLI can warn about them.

use crate::bibtex::{Document, Record};
use crate::types::{Entry, FieldValue};
use indexmap::IndexMap;

/// Sentinel for missing fields and undefined macros.
pub const NOT_AVAILABLE: &str = "N/A";

/// TeX accent commands and their characters, applied after braces are
/// removed (so `{\"u}` and `\"{u}` both read `\"u` by then).
const DIACRITICS: &[(&str, &str)] = &[
    ("\\\"a", "ä"),
    ("\\\"e", "ë"),
    ("\\\"i", "ï"),
    ("\\\"o", "ö"),
    ("\\\"u", "ü"),
    ("\\\"y", "ÿ"),
    ("\\\"A", "Ä"),
    ("\\\"E", "Ë"),
    ("\\\"I", "Ï"),
    ("\\\"O", "Ö"),
    ("\\\"U", "Ü"),
    ("\\'a", "á"),
    ("\\'e", "é"),
    ("\\'i", "í"),
    ("\\'o", "ó"),
    ("\\'u", "ú"),
    ("\\'y", "ý"),
    ("\\'c", "ć"),
    ("\\'n", "ń"),
    ("\\'s", "ś"),
    ("\\'z", "ź"),
    ("\\'A", "Á"),
    ("\\'E", "É"),
    ("\\'I", "Í"),
    ("\\'O", "Ó"),
    ("\\'U", "Ú"),
    ("\\`a", "à"),
    ("\\`e", "è"),
    ("\\`i", "ì"),
    ("\\`o", "ò"),
    ("\\`u", "ù"),
    ("\\`A", "À"),
    ("\\`E", "È"),
    ("\\^a", "â"),
    ("\\^e", "ê"),
    ("\\^i", "î"),
    ("\\^o", "ô"),
    ("\\^u", "û"),
    ("\\^A", "Â"),
    ("\\^E", "Ê"),
    ("\\~a", "ã"),
    ("\\~n", "ñ"),
    ("\\~o", "õ"),
    ("\\~A", "Ã"),
    ("\\~N", "Ñ"),
    ("\\~O", "Õ"),
    ("\\cc", "ç"),
    ("\\cC", "Ç"),
];

/// TeX control words standing for a letter. A control word runs until the
/// first non-letter, so these only match whole words: `\o` is not found
/// inside `\oe` or `\overline`. Matched before braces are removed, while
/// `{\o}rsted` still ends the word at `}`.
const CONTROL_WORDS: &[(&str, &str)] = &[
    ("\\aa", "å"),
    ("\\AA", "Å"),
    ("\\ae", "æ"),
    ("\\AE", "Æ"),
    ("\\oe", "œ"),
    ("\\OE", "Œ"),
    ("\\ss", "ß"),
    ("\\o", "ø"),
    ("\\O", "Ø"),
];

/// Standard BibTeX month abbreviations, predefined like in the usual `.bst`
/// styles. Document `@string`s with the same names override them.
const MONTH_MACROS: &[(&str, &str)] = &[
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Macro name → normalized value. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    values: IndexMap<String, String>,
}

impl MacroTable {
    /// A table holding only the standard month abbreviations.
    pub fn with_standard_months() -> Self {
        let values = MONTH_MACROS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { values }
    }

    /// Standard months overlaid with every `@string` of the document.
    ///
    /// Definitions are normalized in source order against the table built so
    /// far, so a macro may refer to earlier macros but not later ones.
    pub fn from_document(doc: &Document) -> Self {
        let mut table = Self::with_standard_months();
        for (key, value) in doc.macro_definitions() {
            let resolved = normalize(Some(value), &table);
            table.insert(key, resolved);
        }
        table
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flatten an optional field value into display text.
pub fn normalize(value: Option<&FieldValue>, macros: &MacroTable) -> String {
    match value {
        Some(value) => normalize_value(value, macros),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn normalize_value(value: &FieldValue, macros: &MacroTable) -> String {
    match value {
        FieldValue::Leaf(text) | FieldValue::Other(text) => clean_text(text),
        FieldValue::Concatenation(left, right) => format!(
            "{} {}",
            normalize_value(left, macros),
            normalize_value(right, macros)
        ),
        FieldValue::PersonList(people) => people
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| clean_text(&p.display_name()))
            .collect::<Vec<_>>()
            .join(", "),
        FieldValue::MacroReference(key) => macros.get(key).unwrap_or(NOT_AVAILABLE).to_string(),
    }
}

/// Substitute letter control words, strip `{`/`}`, then substitute the
/// accent table.
pub fn clean_text(text: &str) -> String {
    if !text.contains('\\') {
        return text.chars().filter(|c| !matches!(c, '{' | '}')).collect();
    }
    let mut out: String = replace_control_words(text)
        .chars()
        .filter(|c| !matches!(c, '{' | '}'))
        .collect();
    for (command, replacement) in DIACRITICS {
        if out.contains(command) {
            out = out.replace(command, replacement);
        }
    }
    out
}

fn replace_control_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let name_len = tail[1..]
            .bytes()
            .take_while(u8::is_ascii_alphabetic)
            .count();
        let word = &tail[..1 + name_len];
        match CONTROL_WORDS.iter().find(|(command, _)| *command == word) {
            Some((_, letter)) => out.push_str(letter),
            None => out.push_str(word),
        }
        rest = &tail[1 + name_len..];
    }
    out.push_str(rest);
    out
}

/// A macro reference that has no definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedMacro {
    pub entry: String,
    pub field: String,
    pub key: String,
}

/// Every macro reference in the document that cannot be resolved, in
/// document order.
///
/// Entry fields are checked against `macros`. A `@string` body is checked
/// against the definitions that precede it, since that is what it was
/// normalized with; such warnings name the entry as `@string`.
pub fn unresolved_macros(doc: &Document, macros: &MacroTable) -> Vec<UnresolvedMacro> {
    let mut found = Vec::new();
    let mut defined = MacroTable::with_standard_months();
    for record in &doc.records {
        match record {
            Record::Macro { key, value } => {
                for missing in macro_keys(value).filter(|k| defined.get(k).is_none()) {
                    found.push(UnresolvedMacro {
                        entry: "@string".to_string(),
                        field: key.clone(),
                        key: missing.to_string(),
                    });
                }
                defined.insert(key.clone(), String::new());
            }
            Record::Entry(entry) => collect_unresolved(entry, macros, &mut found),
        }
    }
    found
}

/// Macro names referenced by a value, left to right.
fn macro_keys(value: &FieldValue) -> impl Iterator<Item = &str> {
    fn walk<'v>(value: &'v FieldValue, keys: &mut Vec<&'v str>) {
        match value {
            FieldValue::MacroReference(key) => keys.push(key),
            FieldValue::Concatenation(left, right) => {
                walk(left, keys);
                walk(right, keys);
            }
            FieldValue::Leaf(_) | FieldValue::Other(_) | FieldValue::PersonList(_) => {}
        }
    }

    let mut keys = Vec::new();
    walk(value, &mut keys);
    keys.into_iter()
}

fn collect_unresolved(entry: &Entry, macros: &MacroTable, found: &mut Vec<UnresolvedMacro>) {
    for (field, value) in &entry.fields {
        for key in macro_keys(value).filter(|k| macros.get(k).is_none()) {
            found.push(UnresolvedMacro {
                entry: entry.key.clone(),
                field: field.clone(),
                key: key.to_string(),
            });
        }
    }
}
