//! Error types for the configuration engine
//!
//! Covers:
//! - Key parsing failures
//! - Lookups that no search-path directory satisfies
//! - File access and INI syntax errors
//! - Search-path providers that cannot be read or written

use std::path::PathBuf;

use crate::key::KeyError;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed dotted key
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// No directory on the search path defines the key
    #[error("setting not found: {0}")]
    NotFound(String),

    /// IO error while reading a configuration file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax error in a configuration file
    #[error("syntax error in {path} line {line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Search-path storage could not be read or replaced
    #[error("search path unavailable: {0}")]
    SearchPathUnavailable(String),
}

impl EngineError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for path and 1-based line number
    pub fn syntax(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Check if the error only means "not configured"
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = EngineError::NotFound("config.group.value".to_string());
        assert_eq!(err.to_string(), "setting not found: config.group.value");
        assert!(err.is_not_found());
    }

    #[test]
    fn syntax_display() {
        let err = EngineError::syntax("a/b.ini", 3, "expected 'item = value'");
        assert_eq!(
            err.to_string(),
            "syntax error in a/b.ini line 3: expected 'item = value'"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn key_error_conversion() {
        let key_err = KeyError::EmptySegment {
            key: "a..b".to_string(),
        };
        let err: EngineError = key_err.into();
        assert!(matches!(err, EngineError::Key(_)));
    }
}
