//! ucfg configuration engine
//!
//! Settings live in INI files spread over an ordered list of directories
//! (the *search path*). A dotted key names one item:
//!
//! ```text
//! net.http.proxy.host
//! └──┬───┘ └─┬─┘ └┬─┘
//!  file     group item      →  <dir>/net/http.ini, [proxy], host = ...
//! ```
//!
//! Directories earlier on the search path take precedence.
//!
//! # Example
//!
//! ```rust,no_run
//! use ucfg_engine::ConfigEngine;
//!
//! let engine = ConfigEngine::global();
//! engine.set_paths(["/etc/ucfg"]);
//! let host = engine.get_or("net.http.proxy.host", "localhost")?;
//! # Ok::<(), ucfg_engine::EngineError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod engine;
pub mod error;
pub mod ini;
pub mod key;
pub mod provider;

// Re-exports for convenience
pub use engine::{ConfigEngine, PATH_ENV};
pub use error::{EngineError, EngineResult};
pub use ini::{IniDocument, Section};
pub use key::{DottedKey, KeyError, FILE_SUFFIX};
pub use provider::SearchPathProvider;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
