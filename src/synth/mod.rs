//! Record synthesis
//!
//! Turns raw scan candidates into value pools, seeds the master tables,
//! and fabricates sale records at the configured volume. This stage never
//! fails: empty pools fall back to fully synthetic generation, and the
//! generator reports how many records were seeded by extracted values so
//! nobody mistakes the output for recovered data.

pub mod generator;
pub mod masters;
pub mod pools;

pub use generator::{GeneratorReport, RecordGenerator};
pub use masters::{seed_masters, MasterSet};
pub use pools::ValuePools;
