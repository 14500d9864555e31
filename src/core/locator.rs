//! Purpose: Resolve a bare library file name to the first matching file on a search path.
//! Exports: `Locator`, `find_library`, `DEFAULT_LIBRARY_NAME`.
//! Role: Pure lookup; owns nothing and never loads anything.
//! Invariants: Directories are probed in search-path order; the first hit wins.
//! Invariants: Only regular files match (symlinks are followed; dangling links and dirs do not).
//! Invariants: No caching and no retries; every call is one linear scan.
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::search_path::{DEFAULT_SEARCH_VAR, SearchPath};

pub const DEFAULT_LIBRARY_NAME: &str = "Matryoshka.dll";

#[derive(Clone, Debug)]
pub struct Locator {
    search_var: OsString,
    default_name: String,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            search_var: OsString::from(DEFAULT_SEARCH_VAR),
            default_name: DEFAULT_LIBRARY_NAME.to_string(),
        }
    }
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_var(mut self, var: impl Into<OsString>) -> Self {
        self.search_var = var.into();
        self
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    pub fn search_var(&self) -> &OsStr {
        &self.search_var
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Snapshot of the configured search variable at call time.
    pub fn search_path(&self) -> SearchPath {
        SearchPath::from_env(&self.search_var)
    }

    /// Finds `name` (or the default library name) on the configured search path.
    pub fn find(&self, name: Option<&str>) -> Option<PathBuf> {
        let name = name.unwrap_or(self.default_name.as_str());
        Self::find_in(name, &self.search_path())
    }

    pub fn find_default(&self) -> Option<PathBuf> {
        self.find(None)
    }

    /// Finds `name` in an explicit directory list.
    pub fn find_in(name: impl AsRef<Path>, search: &SearchPath) -> Option<PathBuf> {
        let name = name.as_ref();
        let found = search.iter().find_map(|dir| probe(dir, name));
        if found.is_none() {
            debug!(
                name = %name.display(),
                dirs = search.len(),
                "library not found on search path"
            );
        }
        found
    }

    /// Every match in search-path order, including shadowed ones.
    pub fn candidates_in(name: impl AsRef<Path>, search: &SearchPath) -> Vec<PathBuf> {
        let name = name.as_ref();
        search.iter().filter_map(|dir| probe(dir, name)).collect()
    }
}

/// Finds `name` on `PATH`, falling back to `Matryoshka.dll` when `name` is `None`.
pub fn find_library(name: Option<&str>) -> Option<PathBuf> {
    Locator::new().find(name)
}

fn probe(dir: &Path, name: &Path) -> Option<PathBuf> {
    let candidate = dir.join(name);
    // `metadata` follows symlinks, so a dangling link reports an error here.
    match std::fs::metadata(&candidate) {
        Ok(meta) if meta.is_file() => {
            debug!(path = %candidate.display(), "library candidate matched");
            Some(candidate)
        }
        _ => None,
    }
}
