//! BakForge: record salvage and synthesis for corrupted SQL Server backups
//!
//! BakForge does not parse the SQL Server backup format. It scans a `.bak`
//! file as raw bytes, harvests printable candidates (dates, amounts, company
//! names, product names) by pattern matching, and forges a sales-reporting
//! dataset around whatever it found. Extracted values only *seed* the
//! generator: the bulk of every run is fabricated filler, and the run summary
//! reports exactly how much.
//!
//! Pipeline: file -> chunks -> decoded text -> classified candidates ->
//! synthetic records -> batched inserts -> compatibility view.

pub mod classify;
pub mod config;
pub mod db;
pub mod progress;
pub mod scan;
pub mod synth;
pub mod types;

pub use config::Config;
pub use types::*;
