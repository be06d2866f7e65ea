//! Testing utilities for the ucfg workspace
//!
//! Shared fakes, fixtures, and tracing setup.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Once;

use parking_lot::Mutex;
use tempfile::TempDir;
use ucfg_engine::{EngineError, SearchPathProvider};

/// In-memory search path with failure injection
#[derive(Debug, Default)]
pub struct MemorySearchPath {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    paths: Vec<String>,
    set_calls: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemorySearchPath {
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fake = Self::default();
        fake.inner.lock().paths = paths.into_iter().map(Into::into).collect();
        fake
    }

    /// Current list, bypassing failure injection
    pub fn paths(&self) -> Vec<String> {
        self.inner.lock().paths.clone()
    }

    /// Successful `set_search_path` calls so far
    pub fn set_calls(&self) -> usize {
        self.inner.lock().set_calls
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }
}

impl SearchPathProvider for MemorySearchPath {
    fn search_path(&self) -> Result<Vec<String>, EngineError> {
        let state = self.inner.lock();
        if state.fail_reads {
            return Err(EngineError::SearchPathUnavailable("injected read failure".into()));
        }
        Ok(state.paths.clone())
    }

    fn set_search_path(&self, paths: Vec<String>) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        if state.fail_writes {
            return Err(EngineError::SearchPathUnavailable("injected write failure".into()));
        }
        state.paths = paths;
        state.set_calls += 1;
        Ok(())
    }
}

/// Temporary directory of INI fixture files
#[derive(Debug)]
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `text` to `relative`, creating parent directories
    pub fn write(self, relative: impl AsRef<Path>, text: &str) -> Self {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// The directory as a search-path entry
    pub fn entry(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture holding `config.ini` with `[group] value = 5`
pub fn config_fixture() -> FixtureDir {
    FixtureDir::new().write("config.ini", "[group]\nvalue = 5\n")
}

/// Install a test-writer tracing subscriber once per process
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
