//! ucfg test overrides
//!
//! Reversible overrides of file-backed configuration for tests. Overrides
//! are never applied by editing existing files: they are written as new INI
//! files into a private temporary directory which is then placed first on
//! the engine's search path.
//!
//! # Lifecycle
//!
//! ```text
//! Mock::new(entries)      validate keys           (no I/O)
//!   └─ acquire()          write files → push dir  (MockScope)
//!        └─ release()     restore path → rm dir   (also on drop / panic)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ucfg_engine::ConfigEngine;
//! use ucfg_testing::Mock;
//!
//! # fn main() -> Result<(), ucfg_testing::MockError> {
//! let engine = ConfigEngine::global();
//! engine.set_paths(["tests/data"]);
//!
//! let mock = Mock::new([("config.group.value", "1")])?;
//! let scope = mock.acquire()?;
//! assert_eq!(engine.get("config.group.value").unwrap(), "1");
//! scope.release()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod materialize;
pub mod options;
pub mod overrides;
pub mod scope;
pub mod search_path;

// Re-exports for convenience
pub use error::{MockError, MockResult};
pub use materialize::MaterializedOverrides;
pub use options::{ConflictCheck, MockOptions};
pub use overrides::OverrideSet;
pub use scope::{lock, Mock, MockScope, MockSearchPath, MockSearchPathScope, ScopeLock};
pub use search_path::{PushMode, SearchPathGuard};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for tests that override configuration
    pub use crate::error::{MockError, MockResult};
    pub use crate::options::{ConflictCheck, MockOptions};
    pub use crate::scope::{lock, Mock, MockSearchPath};
    pub use ucfg_engine::{ConfigEngine, SearchPathProvider};
}
