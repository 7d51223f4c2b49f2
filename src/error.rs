//! Error types for the lattice engine.
//!
//! Invariant violations (a cross-bridge and binding site disagreeing about
//! their link, a bound query on an unbound head) are bugs and panic. The
//! enums here cover the recoverable cases: bad inputs, solver failure,
//! address lookups and checkpoint import.

use thiserror::Error;

use crate::lattice::Address;

/// Invalid run configuration, reported before any timestep executes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("time trace for {name} is empty")]
    EmptyTrace { name: &'static str },

    #[error("time trace for {name} has {len} entries, expected {expected}")]
    TraceLengthMismatch {
        name: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("time trace for {name} has invalid entry {value} at step {step}")]
    InvalidTraceValue {
        name: &'static str,
        step: usize,
        value: f64,
    },

    #[error("model parameter {name} is invalid: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Failure of the force-balance relaxation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettleError {
    #[error("force balance did not converge after {iterations} sweeps (residual {residual_pN:.4} pN)")]
    MaxIterations { iterations: usize, residual_pN: f64 },

    #[error("force balance diverged on sweep {iteration}: non-finite residual")]
    Diverged { iteration: usize },
}

/// Address lookup failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddressError {
    #[error("address {0:?} does not resolve to a component")]
    Unresolvable(Address),

    #[error("address {address:?} resolves to a {found}, expected a {expected}")]
    WrongKind {
        address: Address,
        expected: &'static str,
        found: &'static str,
    },
}

/// Checkpoint import failure
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unsupported record schema version {0}")]
    UnsupportedVersion(u32),

    #[error("record is missing a schema_version field")]
    MissingVersion,

    #[error("record {what} has {found} entries, lattice expects {expected}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("record binding between {crossbridge:?} and {site:?} is not mutual")]
    BrokenBinding { crossbridge: Address, site: Address },

    #[error("record cross-bridge {crossbridge:?} is {state:?} but bound = {bound}")]
    StateMismatch {
        crossbridge: Address,
        state: crate::physics::XbState,
        bound: bool,
    },

    #[error("record entry at {found:?} is stored where {expected:?} belongs")]
    Misplaced { expected: Address, found: Address },

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while advancing the simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Settle(#[from] SettleError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
