//! Search-path provider capability
//!
//! The ordered list of directories an engine scans is process-wide state.
//! Code that needs to read or replace it takes a [`SearchPathProvider`]
//! instead of reaching for a global, so an in-memory fake can stand in.

use crate::error::EngineError;

/// Read/replace access to an ordered search-path list
///
/// Earlier entries take precedence. `set_search_path` is a total
/// replacement; there is no merge at this boundary.
pub trait SearchPathProvider {
    /// Current search path, highest precedence first
    ///
    /// # Errors
    /// Returns error if the underlying storage cannot be read.
    fn search_path(&self) -> Result<Vec<String>, EngineError>;

    /// Replace the search path
    ///
    /// # Errors
    /// Returns error if the underlying storage cannot be written.
    fn set_search_path(&self, paths: Vec<String>) -> Result<(), EngineError>;
}

impl<P: SearchPathProvider + ?Sized> SearchPathProvider for &P {
    fn search_path(&self) -> Result<Vec<String>, EngineError> {
        (**self).search_path()
    }

    fn set_search_path(&self, paths: Vec<String>) -> Result<(), EngineError> {
        (**self).set_search_path(paths)
    }
}
