//! Purpose: Own one dynamically loaded library handle for a bounded scope.
//! Exports: `LibraryManager`, `LibraryScope`, `with_library`.
//! Role: Load boundary; turns every OS loader failure into an absent handle.
//! Invariants: The handle is either absent or one fully loaded library, never partial.
//! Invariants: `enter` never returns an error; failures are kept only as a diagnostic.
//! Invariants: `exit` is idempotent and never fails; `Drop` always runs it.
//! Invariants: `enter` on a usable manager is a no-op; after a failure or `exit` it retries.
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info, warn};

use super::error::{Error, ErrorKind};

#[derive(Debug)]
pub struct LibraryManager {
    path: PathBuf,
    handle: Option<Library>,
    load_error: Option<Error>,
}

impl LibraryManager {
    /// Stores `path` without touching the filesystem or the loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: None,
            load_error: None,
        }
    }

    /// Constructs and enters in one step, returning a guard that exits on drop.
    pub fn scope(path: impl Into<PathBuf>) -> LibraryScope {
        Self::new(path).into_scope()
    }

    pub fn into_scope(mut self) -> LibraryScope {
        self.enter();
        LibraryScope { manager: self }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attempts to map the library at `path` into the process.
    ///
    /// Missing files, foreign formats, architecture mismatches, and
    /// unresolved dependencies all leave the manager unusable; the
    /// underlying loader error is retained in [`LibraryManager::load_error`].
    pub fn enter(&mut self) -> &mut Self {
        if self.handle.is_some() {
            debug!(path = %self.path.display(), "library already loaded; enter is a no-op");
            return self;
        }

        // SAFETY: loading runs the library's initializers. The manager only
        // owns the handle; callers opt into the library by pointing at it.
        match unsafe { Library::new(&self.path) } {
            Ok(library) => {
                info!(path = %self.path.display(), "loaded library");
                self.handle = Some(library);
                self.load_error = None;
            }
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "library unavailable");
                self.load_error = Some(
                    Error::new(ErrorKind::Unavailable)
                        .with_message("failed to load library")
                        .with_path(&self.path)
                        .with_source(err),
                );
            }
        }
        self
    }

    /// Releases the handle if present. Safe to call any number of times.
    pub fn exit(&mut self) {
        let Some(library) = self.handle.take() else {
            return;
        };
        match library.close() {
            Ok(()) => debug!(path = %self.path.display(), "released library"),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "library release reported an error")
            }
        }
    }

    pub fn is_usable(&self) -> bool {
        self.handle.is_some()
    }

    /// Opaque handle for callers that resolve their own symbols.
    pub fn library(&self) -> Option<&Library> {
        self.handle.as_ref()
    }

    /// Why the most recent `enter` failed, if it did.
    pub fn load_error(&self) -> Option<&Error> {
        self.load_error.as_ref()
    }
}

impl Drop for LibraryManager {
    fn drop(&mut self) {
        self.exit();
    }
}

/// An entered [`LibraryManager`]. Dropping the scope releases the library.
#[derive(Debug)]
pub struct LibraryScope {
    manager: LibraryManager,
}

impl LibraryScope {
    /// Ends the scope early; equivalent to dropping it.
    pub fn close(mut self) {
        self.manager.exit();
    }

    pub fn into_inner(self) -> LibraryManager {
        self.manager
    }
}

impl Deref for LibraryScope {
    type Target = LibraryManager;

    fn deref(&self) -> &LibraryManager {
        &self.manager
    }
}

impl DerefMut for LibraryScope {
    fn deref_mut(&mut self) -> &mut LibraryManager {
        &mut self.manager
    }
}

/// Runs `body` with the library at `path` entered; it is released on every
/// exit path, including unwinding out of `body`.
pub fn with_library<R>(path: impl Into<PathBuf>, body: impl FnOnce(&LibraryManager) -> R) -> R {
    let scope = LibraryManager::scope(path);
    body(&scope)
}
