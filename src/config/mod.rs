//! Configuration module for model constants and run inputs.
//!
//! Model constants include citations to their source publications.

mod lattice_config;
mod parameters;

pub use lattice_config::{LatticeConfig, Overrides, TimeDependence};
pub use parameters::{
    HeadParameters, Parameters, SettleParameters, SpringParameters, ThickParameters,
    ThinParameters, TitinParameters, TropomyosinParameters,
};
