//! Sarcomere Sim - stochastic half-sarcomere lattice simulation
//!
//! Spatially explicit model of a muscle half-sarcomere: thick and thin
//! filaments as spring chains, three-state myosin cross-bridges, titin,
//! and calcium-driven tropomyosin regulation, relaxed to force balance
//! every timestep.

// Allow non-snake-case for unit suffixes in field names (pN, pCa, calcium_M, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod config;
pub mod ensemble;
pub mod error;
pub mod export;
pub mod lattice;
pub mod physics;
pub mod state;

pub use config::{LatticeConfig, Parameters, TimeDependence};
pub use error::{AddressError, ConfigError, RecordError, SettleError, SimulationError};
pub use lattice::{Address, Component, Lattice};
pub use physics::{XbState, XbTransition};
pub use state::{LatticeRecord, TimestepMetrics, TransitionCounts};
