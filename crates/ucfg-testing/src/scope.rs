//! Configuration mocks
//!
//! Two scoped resources built on [`SearchPathGuard`]:
//!
//! - [`Mock`] writes a set of dotted-key overrides to a temporary directory
//!   and puts that directory in front of the search path.
//! - [`MockSearchPath`] swaps the whole search path for a given list.
//!
//! Both validate up front, expose `acquire()` returning a scope handle with
//! an explicit `release()`, and fall back to releasing on drop so a panic
//! inside the scope cannot leak a directory or leave the search path pointing
//! at one that no longer exists.
//!
//! Every scope holds the process-wide [`lock`] while alive, whichever
//! provider it was built with. The lock is re-entrant, so nesting on one
//! thread works; other threads wait. Scopes must still be released in LIFO
//! order.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use ucfg_engine::{ConfigEngine, SearchPathProvider};

use crate::error::{MockError, MockResult};
use crate::materialize::MaterializedOverrides;
use crate::options::MockOptions;
use crate::overrides::OverrideSet;
use crate::search_path::{PushMode, SearchPathGuard};

static SCOPE_LOCK: Lazy<ReentrantMutex<()>> = Lazy::new(|| ReentrantMutex::new(()));

/// Guard returned by [`lock`]
pub type ScopeLock = ReentrantMutexGuard<'static, ()>;

/// Serialize access to the global engine's search path
///
/// Every scope takes this lock itself, so a scope built with an explicit
/// provider that happens to be [`ConfigEngine::global`] is covered too. Tests
/// that read the global engine outside a scope, and expect no other test to
/// be inside one, should hold it too.
#[must_use]
pub fn lock() -> ScopeLock {
    SCOPE_LOCK.lock()
}

/// Override configuration values for the duration of a scope
///
/// ```rust,no_run
/// use ucfg_engine::ConfigEngine;
/// use ucfg_testing::Mock;
///
/// let mock = Mock::new([("config.group.value", "1")])?;
/// mock.run(|_| {
///     assert_eq!(ConfigEngine::global().get("config.group.value").unwrap(), "1");
/// })?;
/// # Ok::<(), ucfg_testing::MockError>(())
/// ```
#[derive(Debug)]
pub struct Mock<P: SearchPathProvider = &'static ConfigEngine> {
    provider: P,
    overrides: OverrideSet,
    options: MockOptions,
}

impl Mock {
    /// Mock over the global engine
    ///
    /// # Errors
    /// Validation errors from [`OverrideSet::build`]; nothing is written.
    pub fn new<I, K, V>(entries: I) -> MockResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        Self::with_options(entries, MockOptions::default())
    }

    /// Mock over the global engine with explicit options
    ///
    /// # Errors
    /// Validation errors from [`OverrideSet::build_with`]; nothing is written.
    pub fn with_options<I, K, V>(entries: I, options: MockOptions) -> MockResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        Self::with_provider_and_options(ConfigEngine::global(), entries, options)
    }
}

impl<P: SearchPathProvider> Mock<P> {
    /// Mock over an explicit search-path provider
    ///
    /// # Errors
    /// Validation errors from [`OverrideSet::build`]; nothing is written.
    pub fn with_provider<I, K, V>(provider: P, entries: I) -> MockResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        Self::with_provider_and_options(provider, entries, MockOptions::default())
    }

    /// Mock over an explicit search-path provider with explicit options
    ///
    /// # Errors
    /// Validation errors from [`OverrideSet::build_with`]; nothing is written.
    pub fn with_provider_and_options<I, K, V>(
        provider: P,
        entries: I,
        options: MockOptions,
    ) -> MockResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let overrides = OverrideSet::build_with(entries, options.conflict_check)?;
        Ok(Self {
            provider,
            overrides,
            options,
        })
    }

    /// The validated overrides
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &OverrideSet {
        &self.overrides
    }

    /// Write the override files and put their directory first on the search path
    ///
    /// # Errors
    /// - `MockError::Io` if the files cannot be written
    /// - `MockError::SearchPath` if the search path cannot be read or set;
    ///   the written directory is removed before returning
    pub fn acquire(&self) -> MockResult<MockScope<'_, P>> {
        let lock = lock();

        let overrides = MaterializedOverrides::materialize(&self.overrides, &self.options)?;
        let entry = overrides.search_path_entry();
        let guard = match SearchPathGuard::push(&self.provider, vec![entry], PushMode::Prepend) {
            Ok(guard) => guard,
            Err(err) => {
                if let Err(cleanup) = overrides.release() {
                    tracing::warn!(error = %cleanup, "failed to remove override directory");
                }
                return Err(err);
            }
        };

        tracing::debug!(
            dir = %overrides.path().display(),
            previous = %guard.saved().join(":"),
            "entered config mock"
        );
        Ok(MockScope {
            dir: overrides.path().to_path_buf(),
            search_path: Some(guard),
            overrides: Some(overrides),
            _lock: lock,
        })
    }

    /// Run `f` inside the scope
    ///
    /// The scope is released after `f` returns, or during unwinding if it
    /// panics. `f` receives the override directory.
    ///
    /// # Errors
    /// Errors from [`Mock::acquire`] and [`MockScope::release`].
    pub fn run<T>(&self, f: impl FnOnce(&Path) -> T) -> MockResult<T> {
        let scope = self.acquire()?;
        let out = f(scope.path());
        scope.release()?;
        Ok(out)
    }

    /// Run a fallible `f` inside the scope
    ///
    /// If both `f` and the release fail, `f`'s error is returned and the
    /// release error is logged.
    ///
    /// # Errors
    /// `f`'s error, or a converted [`MockError`] from acquire or release.
    pub fn try_run<T, E>(&self, f: impl FnOnce(&Path) -> Result<T, E>) -> Result<T, E>
    where
        E: From<MockError>,
    {
        let scope = self.acquire()?;
        let out = f(scope.path());
        finish(out, scope.release())
    }
}

/// Active [`Mock`]
#[derive(Debug)]
#[must_use = "the mock is released when the scope is dropped"]
pub struct MockScope<'m, P: SearchPathProvider> {
    dir: PathBuf,
    search_path: Option<SearchPathGuard<&'m P>>,
    overrides: Option<MaterializedOverrides>,
    _lock: ScopeLock,
}

impl<P: SearchPathProvider> MockScope<'_, P> {
    /// Override directory (first entry of the search path while active)
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Restore the search path, then delete the override directory
    ///
    /// Both steps are always attempted.
    ///
    /// # Errors
    /// The first failure; a second one is logged.
    pub fn release(mut self) -> MockResult<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> MockResult<()> {
        if self.search_path.is_none() && self.overrides.is_none() {
            return Ok(());
        }
        let restored = self.search_path.take().map_or(Ok(()), SearchPathGuard::restore);
        let removed = self.overrides.take().map_or(Ok(()), MaterializedOverrides::release);

        match (restored, removed) {
            (Ok(()), Ok(())) => {
                tracing::debug!(dir = %self.dir.display(), "left config mock");
                Ok(())
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(e), Err(cleanup)) => {
                tracing::warn!(error = %cleanup, "failed to remove override directory");
                Err(e)
            }
        }
    }
}

impl<P: SearchPathProvider> Drop for MockScope<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.release_inner() {
            tracing::warn!(error = %e, "failed to release config mock");
        }
    }
}

/// Replace the whole search path for the duration of a scope
///
/// Unlike [`Mock`], nothing is written and the previous entries are hidden
/// rather than kept behind the new ones.
#[derive(Debug)]
pub struct MockSearchPath<P: SearchPathProvider = &'static ConfigEngine> {
    provider: P,
    paths: Vec<String>,
}

impl MockSearchPath {
    /// Search-path swap on the global engine
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        Self::with_provider(ConfigEngine::global(), paths)
    }
}

impl<P: SearchPathProvider> MockSearchPath<P> {
    /// Search-path swap on an explicit provider
    pub fn with_provider<I, S>(provider: P, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        Self {
            provider,
            paths: paths
                .into_iter()
                .map(|p| p.as_ref().to_string_lossy().into_owned())
                .collect(),
        }
    }

    /// Paths installed while active
    #[inline]
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Install the paths
    ///
    /// # Errors
    /// `MockError::SearchPath` if the search path cannot be read or set.
    pub fn acquire(&self) -> MockResult<MockSearchPathScope<'_, P>> {
        let lock = lock();
        let guard = SearchPathGuard::push(&self.provider, self.paths.clone(), PushMode::Replace)?;
        tracing::debug!(
            paths = %self.paths.join(":"),
            previous = %guard.saved().join(":"),
            "replaced config paths"
        );
        Ok(MockSearchPathScope { guard, _lock: lock })
    }

    /// Run `f` with the paths installed
    ///
    /// # Errors
    /// Errors from [`MockSearchPath::acquire`] and [`MockSearchPathScope::release`].
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> MockResult<T> {
        let scope = self.acquire()?;
        let out = f();
        scope.release()?;
        Ok(out)
    }

    /// Run a fallible `f` with the paths installed
    ///
    /// # Errors
    /// `f`'s error, or a converted [`MockError`] from acquire or release.
    pub fn try_run<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<MockError>,
    {
        let scope = self.acquire()?;
        let out = f();
        finish(out, scope.release())
    }
}

/// Active [`MockSearchPath`]
#[derive(Debug)]
#[must_use = "the search path is restored when the scope is dropped"]
pub struct MockSearchPathScope<'m, P: SearchPathProvider> {
    guard: SearchPathGuard<&'m P>,
    _lock: ScopeLock,
}

impl<P: SearchPathProvider> MockSearchPathScope<'_, P> {
    /// Restore the previous search path
    ///
    /// # Errors
    /// Returns the provider's error if the write fails.
    pub fn release(self) -> MockResult<()> {
        self.guard.restore()
    }
}

/// Combine a scoped closure's result with the scope's release result
fn finish<T, E: From<MockError>>(out: Result<T, E>, released: MockResult<()>) -> Result<T, E> {
    match (out, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            tracing::warn!(error = %cleanup, "release failed after scoped error");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use ucfg_test_utils::MemorySearchPath;

    fn lock_is_contended() -> bool {
        thread::spawn(|| SCOPE_LOCK.try_lock_for(Duration::from_millis(100)).is_none())
            .join()
            .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn acquire_prepends_and_release_restores() {
        let root = tempfile::tempdir().unwrap();
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let mock = Mock::with_provider_and_options(
            &provider,
            [("config.group.value", "1")],
            MockOptions::new().with_temp_root(root.path()),
        )
        .unwrap();

        let scope = mock.acquire().unwrap();
        let dir = scope.path().to_path_buf();
        assert_eq!(
            provider.paths(),
            vec![dir.to_string_lossy().into_owned(), "/etc/app".to_string()]
        );
        assert_eq!(
            fs::read_to_string(dir.join("config.ini")).unwrap(),
            "[group]\nvalue = 1\n"
        );

        scope.release().unwrap();
        assert!(!dir.exists());
        assert_eq!(provider.paths(), strings(&["/etc/app"]));
    }

    #[test]
    fn validation_happens_before_io() {
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let err = Mock::with_provider(&provider, [("a.g2.i2", "x"), ("a.b.g.i", "y")]).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(provider.set_calls(), 0);
    }

    #[test]
    fn failed_push_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let mock = Mock::with_provider_and_options(
            &provider,
            [("config.group.value", "1")],
            MockOptions::new().with_temp_root(root.path()),
        )
        .unwrap();

        provider.fail_writes(true);
        let result = mock.acquire();
        assert!(matches!(result, Err(MockError::SearchPath(_))));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn drop_releases() {
        let root = tempfile::tempdir().unwrap();
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let mock = Mock::with_provider_and_options(
            &provider,
            [("config.group.value", "1")],
            MockOptions::new().with_temp_root(root.path()),
        )
        .unwrap();

        let dir = {
            let scope = mock.acquire().unwrap();
            scope.path().to_path_buf()
        };
        assert!(!dir.exists());
        assert_eq!(provider.paths(), strings(&["/etc/app"]));
    }

    #[test]
    fn release_removes_directory_even_if_restore_fails() {
        let root = tempfile::tempdir().unwrap();
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let mock = Mock::with_provider_and_options(
            &provider,
            [("config.group.value", "1")],
            MockOptions::new().with_temp_root(root.path()),
        )
        .unwrap();

        let scope = mock.acquire().unwrap();
        provider.fail_writes(true);
        let dir = scope.path().to_path_buf();

        assert!(matches!(scope.release(), Err(MockError::SearchPath(_))));
        // The directory is removed even though restoring failed.
        assert!(!dir.exists());
    }

    #[test]
    fn try_run_prefers_closure_error() {
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let mock = Mock::with_provider(&provider, [("config.group.value", "1")]).unwrap();

        let result: Result<(), MockError> = mock.try_run(|_| {
            provider.fail_writes(true);
            Err(MockError::inconsistent("marker.g.i", "marker.ini"))
        });

        assert!(matches!(result, Err(MockError::InconsistentKeys { key, .. }) if key == "marker.g.i"));
    }

    #[test]
    fn try_run_reports_release_error_when_closure_succeeds() {
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let mock = Mock::with_provider(&provider, [("config.group.value", "1")]).unwrap();

        let result: Result<u32, MockError> = mock.try_run(|_| {
            provider.fail_writes(true);
            Ok(7)
        });
        assert!(matches!(result, Err(MockError::SearchPath(_))));
    }

    #[test]
    fn run_returns_closure_value() {
        let provider = MemorySearchPath::default();
        let mock = Mock::with_provider(&provider, [("config.group.value", "1")]).unwrap();

        let seen = mock.run(|dir| dir.join("config.ini").exists()).unwrap();
        assert!(seen);
        assert!(provider.paths().is_empty());
    }

    #[test]
    fn search_path_mock_replaces() {
        let provider = MemorySearchPath::with_paths(["/etc/app", "/usr/share/app"]);
        let mock = MockSearchPath::with_provider(&provider, ["x", "y"]);
        assert_eq!(mock.paths(), strings(&["x", "y"]));

        let scope = mock.acquire().unwrap();
        assert_eq!(provider.paths(), strings(&["x", "y"]));

        scope.release().unwrap();
        assert_eq!(provider.paths(), strings(&["/etc/app", "/usr/share/app"]));
    }

    #[test]
    fn search_path_mock_run() {
        let provider = MemorySearchPath::with_paths(["/base"]);
        let mock = MockSearchPath::with_provider(&provider, [Path::new("/fixtures")]);

        let during = mock.run(|| provider.paths()).unwrap();
        assert_eq!(during, strings(&["/fixtures"]));
        assert_eq!(provider.paths(), strings(&["/base"]));
    }

    #[test]
    fn failed_write_removes_directory_before_touching_path() {
        let root = tempfile::tempdir().unwrap();
        let provider = MemorySearchPath::with_paths(["/etc/app"]);
        let too_long = format!("{}.g.i", "x".repeat(300));
        let mock = Mock::with_provider_and_options(
            &provider,
            [("ok.g.i".to_string(), "1"), (too_long, "2")],
            MockOptions::new().with_temp_root(root.path()),
        )
        .unwrap();
        assert_eq!(mock.overrides().len(), 2);

        let result = mock.acquire();
        assert!(matches!(result, Err(MockError::Io { .. })));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
        assert_eq!(provider.set_calls(), 0);
        assert_eq!(provider.paths(), strings(&["/etc/app"]));
    }

    #[test]
    fn explicit_global_provider_holds_lock() {
        let root = tempfile::tempdir().unwrap();
        let engine = ConfigEngine::global();
        let mock = Mock::with_provider_and_options(
            engine,
            [("c.g.i", "1")],
            MockOptions::new().with_temp_root(root.path()),
        )
        .unwrap();

        let scope = mock.acquire().unwrap();
        assert!(lock_is_contended());
        scope.release().unwrap();

        let swap = MockSearchPath::with_provider(engine, [root.path()]);
        let scope = swap.acquire().unwrap();
        assert!(lock_is_contended());
        scope.release().unwrap();
    }

    #[test]
    fn global_lock_is_reentrant() {
        let _outer = lock();
        let _inner = lock();
    }
}
