//! Bulk loading into the relational reporting schema
//!
//! The loader is a destructive full-refresh: it drops and recreates the
//! schema, inserts masters first to satisfy foreign-key ordering, then
//! streams sale records in fixed-size batches with one transaction per
//! batch. A failed batch aborts the run but prior batches stay committed;
//! resumability is deliberately favored over strict atomicity.

pub mod loader;
pub mod schema;

pub use loader::{BulkLoader, LoadSummary};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by schema creation and bulk loading
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open database '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema creation failed: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("master table insert failed: {0}")]
    Master(#[source] rusqlite::Error),

    /// Batch inserts commit independently; `committed` records from prior
    /// batches survive this failure.
    #[error("sale batch {index} failed ({committed} records already committed): {source}")]
    Batch {
        index: usize,
        committed: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
