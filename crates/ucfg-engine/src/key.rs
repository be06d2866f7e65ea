//! Dotted keys and the key → file mapping
//!
//! Provides [`DottedKey`] for addressing a single configuration item. The
//! key → file mapping defined here is the only one in the workspace: the
//! engine resolves through it and test overrides are written through it.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Suffix appended to the last path segment of a key.
pub const FILE_SUFFIX: &str = "ini";

/// Key addressing one configuration item
///
/// A key is split on `.`. The last two segments are the group (INI section)
/// and the item; everything before them names the file.
///
/// # Examples
/// - `config.group.value` → file `config.ini`, section `group`, item `value`
/// - `net.http.proxy.host` → file `net/http.ini`, section `proxy`, item `host`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DottedKey {
    raw: String,
    segments: Vec<String>,
}

impl DottedKey {
    /// Minimum number of segments: at least one path segment plus group and item.
    pub const MIN_SEGMENTS: usize = 3;

    /// Parse a dotted key
    ///
    /// # Errors
    /// - `KeyError::TooFewSegments` if the key has fewer than three segments
    /// - `KeyError::EmptySegment` for keys such as `a..b.c`
    /// - `KeyError::InvalidSegment` if a segment contains a path separator
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();

        if segments.len() < Self::MIN_SEGMENTS {
            return Err(KeyError::TooFewSegments {
                key: raw.to_string(),
                found: segments.len(),
            });
        }

        for seg in &segments {
            if seg.is_empty() {
                return Err(KeyError::EmptySegment {
                    key: raw.to_string(),
                });
            }
            if seg.contains(['/', '\\']) {
                return Err(KeyError::InvalidSegment {
                    key: raw.to_string(),
                    segment: seg.clone(),
                });
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The key as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// All segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments naming the file (all but group and item)
    #[inline]
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 2]
    }

    /// INI section name
    #[inline]
    #[must_use]
    pub fn group(&self) -> &str {
        &self.segments[self.segments.len() - 2]
    }

    /// Item name within the section
    #[inline]
    #[must_use]
    pub fn item(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Relative path of the file this key lives in
    #[must_use]
    pub fn target_file(&self) -> PathBuf {
        target_file_path(self.path_segments())
    }

    /// Files that would shadow this key's directory structure
    ///
    /// One entry per proper prefix of the path segments, shortest first. For
    /// `a.b.c.g.i` these are `a.ini` and `a/b.ini`: if either exists as a
    /// file, `a` or `a/b` cannot also serve as a directory for `a/b/c.ini`.
    pub fn ancestor_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        let path = self.path_segments();
        (1..path.len()).map(move |len| target_file_path(&path[..len]))
    }
}

/// Map path segments to a relative INI file path
///
/// Segments become directory components; the last one gets the `.ini`
/// suffix. `["a", "b"]` maps to `a/b.ini`.
fn target_file_path(segments: &[String]) -> PathBuf {
    let mut path = PathBuf::new();
    if let Some((last, dirs)) = segments.split_last() {
        path.extend(dirs);
        path.push(format!("{last}.{FILE_SUFFIX}"));
    }
    path
}

impl Display for DottedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DottedKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for DottedKey {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// Errors related to dotted keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Key is missing a path, group or item segment
    #[error("invalid key '{key}': expected at least 3 segments, found {found}")]
    TooFewSegments { key: String, found: usize },

    /// Empty segment in key
    #[error("invalid key '{key}': empty segment")]
    EmptySegment { key: String },

    /// Segment would escape its directory
    #[error("invalid key '{key}': segment '{segment}' contains a path separator")]
    InvalidSegment { key: String, segment: String },
}

impl KeyError {
    /// The offending key
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::TooFewSegments { key, .. }
            | Self::EmptySegment { key }
            | Self::InvalidSegment { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn key_parts() {
        let key = DottedKey::parse("net.http.proxy.host").unwrap();
        assert_eq!(key.segments().len(), 4);
        assert_eq!(key.path_segments(), &["net", "http"]);
        assert_eq!(key.group(), "proxy");
        assert_eq!(key.item(), "host");
    }

    #[test]
    fn key_target_file() {
        let key = DottedKey::parse("config.group.value").unwrap();
        assert_eq!(key.target_file(), Path::new("config.ini"));

        let deep: DottedKey = "a.b.c.g.i".parse().unwrap();
        assert_eq!(deep.target_file(), Path::new("a").join("b").join("c.ini"));
    }

    #[test]
    fn same_path_segments_same_file() {
        let a = DottedKey::parse("a.b.g1.i1").unwrap();
        let b = DottedKey::parse("a.b.g2.i2").unwrap();
        assert_eq!(a.target_file(), b.target_file());
    }

    #[test]
    fn key_ancestor_files() {
        let key = DottedKey::parse("a.b.c.g.i").unwrap();
        let files: Vec<_> = key.ancestor_files().collect();
        assert_eq!(files, vec![PathBuf::from("a.ini"), Path::new("a").join("b.ini")]);

        let shallow = DottedKey::parse("a.g.i").unwrap();
        assert_eq!(shallow.ancestor_files().count(), 0);
    }

    #[test]
    fn key_too_few_segments() {
        let result = DottedKey::parse("group.item");
        assert!(matches!(
            result,
            Err(KeyError::TooFewSegments { found: 2, .. })
        ));

        assert!(DottedKey::parse("single").is_err());
    }

    #[test]
    fn key_empty_segment() {
        let result: Result<DottedKey, _> = "a..g.i".parse();
        assert!(matches!(result, Err(KeyError::EmptySegment { .. })));

        assert!(matches!(
            DottedKey::parse("a.g.i."),
            Err(KeyError::EmptySegment { .. })
        ));
    }

    #[test]
    fn key_separator_rejected() {
        let result = DottedKey::parse("a/b.g.i");
        assert!(matches!(result, Err(KeyError::InvalidSegment { segment, .. }) if segment == "a/b"));
    }

    #[test]
    fn key_display_roundtrips_input() {
        let key = DottedKey::parse("config.group.value").unwrap();
        assert_eq!(key.to_string(), "config.group.value");
        assert_eq!(key.as_str(), "config.group.value");
    }

    #[test]
    fn key_error_reports_key() {
        let err = DottedKey::parse("x.y").unwrap_err();
        assert_eq!(err.key(), "x.y");
        assert!(err.to_string().contains("at least 3 segments"));
    }
}
