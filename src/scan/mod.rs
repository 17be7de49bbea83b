//! Byte-level scanning of the backup file
//!
//! The `.bak` file is never parsed as a SQL Server backup. It is read as an
//! opaque byte stream in fixed-size chunks, each chunk is decoded under two
//! best-effort text encodings, and a fixed set of pattern matchers pulls out
//! candidate substrings per category. A candidate that straddles a chunk
//! boundary may be missed or duplicated; the configurable overlap window
//! reduces (but does not eliminate) boundary loss, and that approximation is
//! accepted.

pub mod decode;
pub mod extractor;
pub mod reader;
pub mod scanner;

pub use extractor::{CandidateExtractor, CandidateSet};
pub use reader::ChunkedReader;
pub use scanner::{ScanOutcome, Scanner};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during scanning. Decode and pattern failures are
/// recovered locally and never reach this enum; only I/O is fatal.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction worker panicked")]
    WorkerPanic,
}
