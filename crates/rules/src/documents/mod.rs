//! Directory-backed YAML document store.
//!
//! Scans a directory (recursively) for `*.yml` / `*.yaml` documents, parses
//! them via the two-pass envelope, and keeps them in memory keyed by
//! `metadata.id`. Writes are atomic (tmp file + rename).

mod core;
mod error;


pub use self::core::DocumentStore;
pub use self::error::{LoadResult, LoadStatus, Result, StoreError};
