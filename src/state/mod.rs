//! Observables and checkpoint records derived from the lattice.
//!
//! `metrics` is the per-timestep summary handed to run callbacks;
//! `record` is the full versioned snapshot used for save and restore.

mod metrics;
mod record;

pub use metrics::{DisplacementStats, TimestepMetrics, TransitionCounts};
pub use record::{
    migrate_record, BindingSiteRecord, CrossbridgeRecord, LatticeRecord, ScalarRecord,
    ThickRecord, ThinRecord, RECORD_SCHEMA_VERSION,
};
