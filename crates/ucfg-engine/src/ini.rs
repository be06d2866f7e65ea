//! INI documents
//!
//! The on-disk format shared by the engine (which reads it) and the test
//! override layer (which writes it):
//!
//! ```text
//! [group]
//! item = value
//! item2 = value2
//! ```
//!
//! Sections and items keep their first-seen order so rendering is
//! reproducible. No quoting or escaping is performed in either direction.

use std::fmt::Write as _;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::EngineError;

/// Items of one section, in first-seen order
pub type Section = IndexMap<String, String>;

/// Parsed or staged INI file contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: IndexMap<String, Section>,
}

impl IniDocument {
    /// Create an empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text
    ///
    /// Blank lines and lines starting with `#` or `;` are ignored. Items are
    /// split on the first `=` and both sides are trimmed. A repeated item
    /// keeps the last value.
    ///
    /// # Errors
    /// Returns `EngineError::Syntax` for an item outside any section or a
    /// line that is neither a header nor an assignment. `origin` only labels
    /// the error.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, EngineError> {
        let mut doc = Self::new();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| {
                    EngineError::syntax(origin, idx + 1, "unterminated section header")
                })?;
                let name = name.trim().to_string();
                doc.sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let (item, value) = line
                .split_once('=')
                .ok_or_else(|| EngineError::syntax(origin, idx + 1, "expected 'item = value'"))?;
            let section = current.as_deref().ok_or_else(|| {
                EngineError::syntax(origin, idx + 1, "item defined before any section")
            })?;
            doc.insert(section, item.trim(), value.trim());
        }

        Ok(doc)
    }

    /// Set `item` in `section`, creating the section if needed
    ///
    /// Returns the previous value, if any. An overwritten item keeps its
    /// original position.
    pub fn insert(
        &mut self,
        section: impl Into<String>,
        item: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(item.into(), value.into())
    }

    /// Look up an item
    #[must_use]
    pub fn get(&self, section: &str, item: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(item))
            .map(String::as_str)
    }

    /// Look up a whole section
    #[inline]
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Iterate sections in first-seen order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, s)| (name.as_str(), s))
    }

    /// Number of items across all sections
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.sections.values().map(IndexMap::len).sum()
    }

    /// Check whether the document has no sections
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render as INI text: one `[group]` header per section followed by
    /// `item = value` lines, every line newline-terminated.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, items) in &self.sections {
            let _ = writeln!(out, "[{name}]");
            for (item, value) in items {
                let _ = writeln!(out, "{item} = {value}");
            }
        }
        out
    }
}
