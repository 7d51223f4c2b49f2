//! CSV time-series export for timestep metrics.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::state::TimestepMetrics;

/// One CSV row; nested metric groups flattened to columns
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesRecord {
    pub timestep: usize,
    /// Simulated time (ms)
    pub time_ms: f64,
    pub z_line_nm: f64,
    pub lattice_spacing_nm: f64,
    pub pCa: f64,
    /// Axial force on the M-line (pN)
    pub axial_force_pN: f64,
    pub radial_force_y_pN: f64,
    pub radial_force_z_pN: f64,
    pub radial_tension_pN: f64,
    pub xb_free: f64,
    pub xb_loose: f64,
    pub xb_tight: f64,
    pub trans_12: usize,
    pub trans_21: usize,
    pub trans_23: usize,
    pub trans_32: usize,
    pub trans_31: usize,
    pub trans_static: usize,
    pub tm_active: f64,
    pub permissiveness: f64,
    pub thick_disp_mean_nm: f64,
    pub thick_disp_max_nm: f64,
    pub thin_disp_mean_nm: f64,
    pub thin_disp_max_nm: f64,
    pub xb_energy_pN_nm: f64,
}

impl From<&TimestepMetrics> for TimeSeriesRecord {
    fn from(m: &TimestepMetrics) -> Self {
        Self {
            timestep: m.timestep,
            time_ms: m.time_ms,
            z_line_nm: m.z_line_nm,
            lattice_spacing_nm: m.lattice_spacing_nm,
            pCa: m.pCa,
            axial_force_pN: m.axial_force_pN,
            radial_force_y_pN: m.radial_force_y_pN,
            radial_force_z_pN: m.radial_force_z_pN,
            radial_tension_pN: m.radial_tension_pN,
            xb_free: m.xb_fraction_free,
            xb_loose: m.xb_fraction_loose,
            xb_tight: m.xb_fraction_tight,
            trans_12: m.transitions.bind_12,
            trans_21: m.transitions.unbind_21,
            trans_23: m.transitions.stroke_23,
            trans_32: m.transitions.reverse_32,
            trans_31: m.transitions.detach_31,
            trans_static: m.transitions.none,
            tm_active: m.tm_fraction_active,
            permissiveness: m.actin_permissiveness_mean,
            thick_disp_mean_nm: m.thick_displacement.mean,
            thick_disp_max_nm: m.thick_displacement.max,
            thin_disp_mean_nm: m.thin_displacement.mean,
            thin_disp_max_nm: m.thin_displacement.max,
            xb_energy_pN_nm: m.crossbridge_energy_pN_nm,
        }
    }
}

/// CSV exporter for metric time series
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Record every n-th timestep
    sample_interval: usize,
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing to `exports/timeseries_<timestamp>.csv`
    ///
    /// Creates the exports directory if it doesn't exist.
    pub fn new(sample_interval: usize) -> Result<Self> {
        let dir = PathBuf::from("exports");
        std::fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("timeseries_{}.csv", timestamp));
        Self::create(&path, sample_interval)
    }

    /// Create an exporter writing to `path`
    pub fn create<P: AsRef<Path>>(path: P, sample_interval: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval: sample_interval.max(1),
            path,
        })
    }

    /// Record a row if the timestep falls on the sample interval
    pub fn maybe_record(&mut self, metrics: &TimestepMetrics) -> Result<bool> {
        if metrics.timestep % self.sample_interval == 0 {
            self.record(metrics)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Record a row regardless of interval
    pub fn record(&mut self, metrics: &TimestepMetrics) -> Result<()> {
        self.writer.serialize(TimeSeriesRecord::from(metrics))?;
        Ok(())
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {}", self.path.display());
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
