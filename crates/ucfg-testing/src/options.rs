//! Mock configuration

use std::path::PathBuf;

/// How [`OverrideSet`](crate::OverrideSet) detects file/directory conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictCheck {
    /// Check each key against the files registered before it.
    ///
    /// Order-dependent: `a.g.i` followed by `a.b.g.i` is rejected, the
    /// reverse order is accepted.
    #[default]
    Incremental,

    /// Check every file against the complete set, regardless of input order.
    Exhaustive,
}

/// Options for a configuration mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOptions {
    /// Prefix of the temporary directory name
    pub temp_prefix: String,
    /// Parent of the temporary directory (`None` = platform temp dir)
    pub temp_root: Option<PathBuf>,
    /// Conflict detection mode
    pub conflict_check: ConflictCheck,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            temp_prefix: "ucfg-mock-".to_string(),
            temp_root: None,
            conflict_check: ConflictCheck::default(),
        }
    }
}

impl MockOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temporary directory prefix
    #[inline]
    #[must_use]
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Create temporary directories under `root`
    #[inline]
    #[must_use]
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Set the conflict detection mode
    #[inline]
    #[must_use]
    pub fn with_conflict_check(mut self, check: ConflictCheck) -> Self {
        self.conflict_check = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = MockOptions::default();
        assert_eq!(options.temp_prefix, "ucfg-mock-");
        assert!(options.temp_root.is_none());
        assert_eq!(options.conflict_check, ConflictCheck::Incremental);
    }

    #[test]
    fn builder() {
        let options = MockOptions::new()
            .with_temp_prefix("custom-")
            .with_temp_root("/var/tmp")
            .with_conflict_check(ConflictCheck::Exhaustive);

        assert_eq!(options.temp_prefix, "custom-");
        assert_eq!(options.temp_root, Some(PathBuf::from("/var/tmp")));
        assert_eq!(options.conflict_check, ConflictCheck::Exhaustive);
    }
}
