//! Purpose: Define the stable public Rust API boundary for the Matryoshka loader.
//! Exports: Locator, search path, handle manager, config, and error types.
//! Role: Public, additive-only surface used by the CLI and embedding callers.
//! Invariants: This module is the only public path callers should depend on.
//! Invariants: Loading never raises; callers branch on `LibraryManager::is_usable`.

pub use crate::config::{LIBRARY_NAME_ENV, LoaderConfig, SEARCH_VAR_ENV};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::library::{LibraryManager, LibraryScope, with_library};
pub use crate::core::locator::{DEFAULT_LIBRARY_NAME, Locator, find_library};
pub use crate::core::search_path::{DEFAULT_SEARCH_VAR, SearchPath};
pub use libloading::Library;
