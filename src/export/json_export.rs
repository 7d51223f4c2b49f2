//! JSON checkpoint export and import.
//!
//! A checkpoint file wraps a [`LatticeRecord`] with an export timestamp.
//! Loading goes through [`migrate_record`] so files written by older
//! schema versions still restore.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::{migrate_record, LatticeRecord};

/// Checkpoint file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointExport {
    /// Export timestamp (RFC 3339)
    pub exported_at: String,
    /// Crate version that wrote the file
    pub version: String,
    pub lattice: LatticeRecord,
}

impl CheckpointExport {
    fn new(record: &LatticeRecord) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            lattice: record.clone(),
        }
    }
}

/// Export a checkpoint to `exports/checkpoint_<timestamp>.json`
///
/// Returns the path to the saved file.
pub fn export_checkpoint_json(record: &LatticeRecord) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let filename = format!("checkpoint_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    export_checkpoint_json_to(record, &path)?;
    Ok(path)
}

/// Export a checkpoint to a specific file
pub fn export_checkpoint_json_to<P: AsRef<Path>>(record: &LatticeRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &CheckpointExport::new(record))?;

    log::info!(
        "Checkpoint exported at timestep {}: {}",
        record.current_timestep,
        path.display()
    );
    Ok(())
}

/// Load a checkpoint file, upgrading old record versions
pub fn load_checkpoint_json<P: AsRef<Path>>(path: P) -> Result<LatticeRecord> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading checkpoint {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&text)?;
    let lattice = value
        .get_mut("lattice")
        .map(Value::take)
        .with_context(|| format!("{} has no lattice record", path.display()))?;
    Ok(migrate_record(lattice)?)
}
