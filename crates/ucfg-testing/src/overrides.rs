//! Override sets
//!
//! Turns a flat `dotted key → value` mapping into the INI files that would
//! define those values, validating the whole mapping before any of it is
//! written.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use ucfg_engine::{DottedKey, IniDocument};

use crate::error::{MockError, MockResult};
use crate::options::ConflictCheck;

/// Validated, in-memory staging of override files
///
/// Keyed by the file's path relative to the override directory, in the order
/// files were first referenced. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    files: IndexMap<PathBuf, IniDocument>,
}

impl OverrideSet {
    /// Build with the default, order-dependent conflict check
    ///
    /// # Errors
    /// - `MockError::MalformedKey` if a key has fewer than three segments
    /// - `MockError::InconsistentKeys` if a key needs a directory where an
    ///   earlier key put a file
    pub fn build<I, K, V>(entries: I) -> MockResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        Self::build_with(entries, ConflictCheck::Incremental)
    }

    /// Build with an explicit conflict check
    ///
    /// Duplicate `(file, group, item)` triples keep the last value.
    ///
    /// # Errors
    /// Same as [`OverrideSet::build`].
    pub fn build_with<I, K, V>(entries: I, check: ConflictCheck) -> MockResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let mut files: IndexMap<PathBuf, IniDocument> = IndexMap::new();
        // Exhaustive mode needs the key that created each file for its error.
        let mut owners: IndexMap<PathBuf, DottedKey> = IndexMap::new();

        for (raw, value) in entries {
            let key = DottedKey::parse(raw.as_ref())?;

            if check == ConflictCheck::Incremental {
                if let Some(conflict) = key.ancestor_files().find(|f| files.contains_key(f)) {
                    return Err(MockError::inconsistent(key.as_str(), conflict));
                }
            }

            let target = key.target_file();
            owners.entry(target.clone()).or_insert_with(|| key.clone());
            files
                .entry(target)
                .or_default()
                .insert(key.group(), key.item(), value.to_string());
        }

        if check == ConflictCheck::Exhaustive {
            for key in owners.values() {
                if let Some(conflict) = key.ancestor_files().find(|f| files.contains_key(f)) {
                    return Err(MockError::inconsistent(key.as_str(), conflict));
                }
            }
        }

        Ok(Self { files })
    }

    /// Number of distinct files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no overrides were given
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Staged contents of one file
    #[inline]
    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&IniDocument> {
        self.files.get(path.as_ref())
    }

    /// Iterate files in first-referenced order
    pub fn files(&self) -> impl Iterator<Item = (&Path, &IniDocument)> {
        self.files.iter().map(|(p, doc)| (p.as_path(), doc))
    }
}
