//! Scoped search-path changes
//!
//! [`SearchPathGuard`] snapshots a provider's search path, installs a new one
//! and puts the snapshot back exactly once: on [`SearchPathGuard::restore`]
//! or, failing that, when dropped.
//!
//! Guards over the same provider must be restored in LIFO order. Restoring
//! an outer guard while an inner one is live leaves the inner guard holding a
//! stale snapshot; this is not detected.

use ucfg_engine::SearchPathProvider;

use crate::error::MockResult;

/// How pushed entries combine with the current search path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    /// New entries first, then the previous list
    Prepend,
    /// New entries only; the previous list is hidden until restore
    Replace,
}

/// Restores a saved search path when finished
#[derive(Debug)]
#[must_use = "the previous search path is restored when the guard is dropped"]
pub struct SearchPathGuard<P: SearchPathProvider> {
    provider: P,
    saved: Option<Vec<String>>,
}

impl<P: SearchPathProvider> SearchPathGuard<P> {
    /// Snapshot the current search path and install `entries`
    ///
    /// # Errors
    /// Provider errors are returned unchanged. If the read fails nothing was
    /// changed; if the write fails the provider keeps its previous list.
    pub fn push(provider: P, entries: Vec<String>, mode: PushMode) -> MockResult<Self> {
        let saved = provider.search_path()?;

        let next = match mode {
            PushMode::Prepend => entries.into_iter().chain(saved.iter().cloned()).collect(),
            PushMode::Replace => entries,
        };
        provider.set_search_path(next)?;

        Ok(Self {
            provider,
            saved: Some(saved),
        })
    }

    /// The search path as it was before this guard was pushed
    #[must_use]
    pub fn saved(&self) -> &[String] {
        self.saved.as_deref().unwrap_or_default()
    }

    /// Put the snapshot back
    ///
    /// Whatever happened to the search path in between is discarded.
    ///
    /// # Errors
    /// Returns the provider's error if the write fails.
    pub fn restore(mut self) -> MockResult<()> {
        self.restore_saved()
    }

    fn restore_saved(&mut self) -> MockResult<()> {
        match self.saved.take() {
            Some(saved) => {
                self.provider.set_search_path(saved)?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<P: SearchPathProvider> Drop for SearchPathGuard<P> {
    fn drop(&mut self) {
        if let Err(e) = self.restore_saved() {
            tracing::warn!(error = %e, "failed to restore search path");
        }
    }
}
