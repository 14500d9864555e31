// Core modules implementing library lookup, loading, and error modeling.
pub mod error;
pub mod library;
pub mod locator;
pub mod search_path;
