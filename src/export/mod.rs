//! Export functionality for simulation data.
//!
//! Provides CSV time-series export of per-timestep metrics and JSON
//! checkpoint save/load.

mod csv_export;
mod json_export;

pub use csv_export::{CsvExporter, TimeSeriesRecord};
pub use json_export::{
    export_checkpoint_json, export_checkpoint_json_to, load_checkpoint_json, CheckpointExport,
};
