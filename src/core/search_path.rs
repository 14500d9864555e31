//! Purpose: Model the ordered directory list used to resolve bare library names.
//! Exports: `SearchPath`, `DEFAULT_SEARCH_VAR`.
//! Role: Single place that reads and splits platform path-list values.
//! Invariants: Order is preserved exactly as configured; earlier entries win.
//! Invariants: An unset variable is an empty list, never an error.
//! Invariants: Empty entries (e.g. `a::b`) are dropped rather than treated as `.`.
//! Invariants: Lookups never resolve an empty entry against the current directory,
//! unlike a plain `dir/name` join over the raw list.
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{Error, ErrorKind};

pub const DEFAULT_SEARCH_VAR: &str = "PATH";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads `var` from the process environment and splits it with the
    /// platform separator (`:` on Unix, `;` on Windows).
    pub fn from_env(var: impl AsRef<OsStr>) -> Self {
        let var = var.as_ref();
        match std::env::var_os(var) {
            Some(value) => Self::parse(&value),
            None => {
                debug!(var = %var.to_string_lossy(), "search variable unset; using empty list");
                Self::empty()
            }
        }
    }

    pub fn parse(value: &OsStr) -> Self {
        Self::from_dirs(std::env::split_paths(value))
    }

    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs = dirs
            .into_iter()
            .map(Into::<PathBuf>::into)
            .filter(|dir: &PathBuf| !dir.as_os_str().is_empty())
            .collect();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Joins the list back into a single platform path-list value.
    pub fn to_os_string(&self) -> Result<OsString, Error> {
        std::env::join_paths(&self.dirs).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("search path entry contains the platform separator")
                .with_source(err)
        })
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::from_dirs(iter)
    }
}
