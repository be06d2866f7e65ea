//! Error types for configuration mocks
//!
//! Provides error handling for:
//! - Override validation (before anything touches the filesystem)
//! - Materialization and cleanup of override files
//! - Search-path reads and writes

use std::path::PathBuf;

use ucfg_engine::{EngineError, KeyError};

/// Main mock error type
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// Key has fewer than three segments or an unusable segment
    #[error("malformed key: {0}")]
    MalformedKey(#[from] KeyError),

    /// Key needs a directory where another key already placed a file
    #[error("inconsistent keys: '{key}' needs a directory where {conflict} is a file")]
    InconsistentKeys { key: String, conflict: PathBuf },

    /// IO error while writing override files
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Search path could not be read or replaced
    #[error("search path error: {0}")]
    SearchPath(#[from] EngineError),

    /// Temporary directory could not be removed
    #[error("cleanup of {path} failed: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MockError {
    /// Create inconsistent-keys error
    pub fn inconsistent(key: impl Into<String>, conflict: impl Into<PathBuf>) -> Self {
        Self::InconsistentKeys {
            key: key.into(),
            conflict: conflict.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create cleanup error for path
    pub fn cleanup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Cleanup {
            path: path.into(),
            source,
        }
    }

    /// Check if the error was raised while validating keys
    ///
    /// Validation errors happen before any file is written or the search
    /// path is touched, so there is nothing to roll back.
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MalformedKey(_) | Self::InconsistentKeys { .. })
    }
}

/// Result type alias for mock operations
pub type MockResult<T> = Result<T, MockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistent_display() {
        let err = MockError::inconsistent("a.b.g.i", "a.ini");
        assert_eq!(
            err.to_string(),
            "inconsistent keys: 'a.b.g.i' needs a directory where a.ini is a file"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn malformed_key_conversion() {
        let err: MockError = KeyError::TooFewSegments {
            key: "a.b".to_string(),
            found: 2,
        }
        .into();
        assert!(matches!(err, MockError::MalformedKey(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn environment_errors_are_not_validation() {
        let err = MockError::cleanup(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_validation());
        assert!(err.to_string().starts_with("cleanup of /tmp/x failed"));

        let err: MockError = EngineError::SearchPathUnavailable("gone".to_string()).into();
        assert!(matches!(err, MockError::SearchPath(_)));
    }
}
