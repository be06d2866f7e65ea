//! Configuration engine
//!
//! Resolves dotted keys by scanning an ordered list of directories. For a key
//! `a.b.group.item` every directory is probed for `a/b.ini`; the first file
//! that defines `[group] item` wins. Directories earlier on the search path
//! therefore override later ones item by item.
//!
//! Parsed files are cached until the search path changes or [`ConfigEngine::reload`]
//! is called.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{EngineError, EngineResult};
use crate::ini::IniDocument;
use crate::key::DottedKey;
use crate::provider::SearchPathProvider;

/// Environment variable seeding the global engine's search path
///
/// Uses the platform path-list syntax (`:`-separated on Unix).
pub const PATH_ENV: &str = "UCFG_PATH";

static GLOBAL: Lazy<ConfigEngine> = Lazy::new(ConfigEngine::from_env);

/// Search-path based configuration engine
#[derive(Debug, Default)]
pub struct ConfigEngine {
    state: Mutex<EngineState>,
}

#[derive(Debug, Default)]
struct EngineState {
    search_path: Vec<String>,
    /// `None` records a file that does not exist.
    files: HashMap<PathBuf, Option<Arc<IniDocument>>>,
}

impl ConfigEngine {
    /// Create an engine with an empty search path
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine whose search path comes from [`PATH_ENV`]
    #[must_use]
    pub fn from_env() -> Self {
        let engine = Self::new();
        if let Some(raw) = std::env::var_os(PATH_ENV) {
            let paths: Vec<String> = std::env::split_paths(&raw)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            tracing::debug!(var = PATH_ENV, count = paths.len(), "search path from environment");
            engine.set_paths(paths);
        }
        engine
    }

    /// Process-wide engine
    #[inline]
    #[must_use]
    pub fn global() -> &'static ConfigEngine {
        &GLOBAL
    }

    /// Current search path, highest precedence first
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().search_path.clone()
    }

    /// Replace the search path and drop every cached file
    pub fn set_paths<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        tracing::debug!(paths = %paths.join(":"), "search path replaced");

        let mut state = self.state.lock();
        state.search_path = paths;
        state.files.clear();
    }

    /// Forget cached files so the next lookup re-reads them
    pub fn reload(&self) {
        self.state.lock().files.clear();
    }

    /// Resolve a setting
    ///
    /// # Errors
    /// - `EngineError::Key` if `key` is malformed
    /// - `EngineError::NotFound` if no directory defines it
    /// - `EngineError::Io` / `EngineError::Syntax` if a candidate file is unreadable
    pub fn get(&self, key: &str) -> EngineResult<String> {
        let key = DottedKey::parse(key)?;
        let relative = key.target_file();

        let mut state = self.state.lock();
        for dir in state.search_path.clone() {
            let path = Path::new(&dir).join(&relative);
            let Some(doc) = state.load(&path)? else {
                continue;
            };
            if let Some(value) = doc.get(key.group(), key.item()) {
                tracing::trace!(%key, file = %path.display(), "resolved setting");
                return Ok(value.to_string());
            }
        }

        Err(EngineError::NotFound(key.to_string()))
    }

    /// Resolve a setting, mapping "not found" to `None`
    ///
    /// # Errors
    /// Same as [`ConfigEngine::get`] except `NotFound`.
    pub fn get_opt(&self, key: &str) -> EngineResult<Option<String>> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(EngineError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve a setting with a fallback
    ///
    /// # Errors
    /// Same as [`ConfigEngine::get`] except `NotFound`.
    pub fn get_or(&self, key: &str, default: impl Into<String>) -> EngineResult<String> {
        Ok(self.get_opt(key)?.unwrap_or_else(|| default.into()))
    }

    /// Check whether a setting resolves
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.get_opt(key), Ok(Some(_)))
    }
}

impl EngineState {
    fn load(&mut self, path: &Path) -> EngineResult<Option<Arc<IniDocument>>> {
        if let Some(cached) = self.files.get(path) {
            return Ok(cached.clone());
        }

        let doc = match std::fs::read_to_string(path) {
            Ok(text) => Some(Arc::new(IniDocument::parse(&text, path)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(EngineError::io_error(path, e)),
        };
        self.files.insert(path.to_path_buf(), doc.clone());
        Ok(doc)
    }
}

impl SearchPathProvider for ConfigEngine {
    fn search_path(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.paths())
    }

    fn set_search_path(&self, paths: Vec<String>) -> Result<(), EngineError> {
        self.set_paths(paths);
        Ok(())
    }
}
