//! Purpose: Loader configuration shared by the CLI and library callers.
//! Exports: `LoaderConfig`, `SEARCH_VAR_ENV`, `LIBRARY_NAME_ENV`.
//! Role: Keep defaults and environment overrides in one place.
//! Invariants: Defaults are `PATH` and `Matryoshka.dll`.
//! Invariants: Empty override values are ignored rather than producing empty names.
use std::ffi::OsString;

use crate::core::locator::{DEFAULT_LIBRARY_NAME, Locator};
use crate::core::search_path::DEFAULT_SEARCH_VAR;

/// Names the environment variable whose value is the directory list to search.
pub const SEARCH_VAR_ENV: &str = "MATRYOSHKA_SEARCH_VAR";
/// Overrides the library file name used when no name is given.
pub const LIBRARY_NAME_ENV: &str = "MATRYOSHKA_LIBRARY";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoaderConfig {
    pub search_var: OsString,
    pub default_name: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_var: OsString::from(DEFAULT_SEARCH_VAR),
            default_name: DEFAULT_LIBRARY_NAME.to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(var) = lookup(SEARCH_VAR_ENV).filter(|value| !value.is_empty()) {
            config.search_var = var;
        }
        if let Some(name) = lookup(LIBRARY_NAME_ENV)
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string_lossy().into_owned())
        {
            config.default_name = name;
        }
        config
    }

    pub fn with_search_var(mut self, var: impl Into<OsString>) -> Self {
        self.search_var = var.into();
        self
    }

    pub fn locator(&self) -> Locator {
        Locator::new()
            .with_search_var(self.search_var.clone())
            .with_default_name(self.default_name.clone())
    }
}
