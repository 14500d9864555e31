//! Purpose: Library crate backing the `matryoshka` CLI and embedding callers.
//! Exports: `api` (stable surface), `core` (locator, search path, loader, errors), `config`.
//! Role: Find the Matryoshka shared library on a search path and own its handle for a scope.
//! Invariants: Library-load failures surface as an unusable manager, never as a raised error.
//! Invariants: Symbols of the loaded library are not bound here; callers use the raw handle.
pub mod api;
pub mod config;
pub mod core;
