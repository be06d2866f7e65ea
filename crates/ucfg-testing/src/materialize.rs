//! Writing override sets to disk
//!
//! [`MaterializedOverrides`] owns a freshly created temporary directory
//! holding one INI file per entry of an [`OverrideSet`]. The directory is
//! removed by [`MaterializedOverrides::release`], or best-effort on drop.

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};
use ucfg_engine::IniDocument;

use crate::error::{MockError, MockResult};
use crate::options::MockOptions;
use crate::overrides::OverrideSet;

/// Override files written to an exclusively owned temporary directory
#[derive(Debug)]
pub struct MaterializedOverrides {
    dir: TempDir,
}

impl MaterializedOverrides {
    /// Create the temporary directory and write every file of `set`
    ///
    /// Each file is written under a temporary name in its final directory
    /// and then renamed into place, so readers never see a partial file.
    ///
    /// # Errors
    /// Returns `MockError::Io` if the directory or a file cannot be created.
    /// Whatever was already written is removed before returning.
    pub fn materialize(set: &OverrideSet, options: &MockOptions) -> MockResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&options.temp_prefix);
        let dir = match &options.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| {
            let root = options.temp_root.clone().unwrap_or_else(std::env::temp_dir);
            MockError::io_error(root, e)
        })?;

        let materialized = Self { dir };
        for (relative, doc) in set.files() {
            if let Err(err) = materialized.write_file(relative, doc) {
                if let Err(cleanup) = materialized.release() {
                    tracing::warn!(error = %cleanup, "failed to remove partial override directory");
                }
                return Err(err);
            }
        }

        tracing::debug!(
            dir = %materialized.path().display(),
            files = set.len(),
            "materialized config overrides"
        );
        Ok(materialized)
    }

    /// Root of the override directory
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root of the override directory as a search-path entry
    #[must_use]
    pub fn search_path_entry(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    fn write_file(&self, relative: &Path, doc: &IniDocument) -> MockResult<()> {
        let dst = self.path().join(relative);
        let parent = dst.parent().unwrap_or_else(|| self.path());
        std::fs::create_dir_all(parent).map_err(|e| MockError::io_error(parent, e))?;

        let mut staged = NamedTempFile::new_in(parent).map_err(|e| MockError::io_error(parent, e))?;
        staged
            .write_all(doc.render().as_bytes())
            .and_then(|()| staged.flush())
            .map_err(|e| MockError::io_error(&dst, e))?;
        staged
            .persist(&dst)
            .map_err(|e| MockError::io_error(&dst, e.error))?;

        tracing::trace!(file = %dst.display(), "wrote override file");
        Ok(())
    }

    /// Remove the directory and everything in it
    ///
    /// A directory that is already gone, fully or partly, is not an error.
    ///
    /// # Errors
    /// Returns `MockError::Cleanup` for any other filesystem failure, such as
    /// permission denied.
    pub fn release(self) -> MockResult<()> {
        let path = self.path().to_path_buf();
        let closed = self.dir.close();
        close_outcome(path, closed)
    }
}

fn close_outcome(path: PathBuf, closed: io::Result<()>) -> MockResult<()> {
    match closed {
        Ok(()) => {
            tracing::debug!(dir = %path.display(), "removed config overrides");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MockError::cleanup(path, e)),
    }
}
