//! Per-timestep observables handed to run callbacks and exporters.
//!
//! This aggregates the lattice's mechanical and kinetic state into a flat
//! record that serializes straight to a CSV row or a JSON object.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::lattice::Lattice;
use crate::physics::XbTransition;

/// Cross-bridge transitions of each kind over some interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCounts {
    /// free → loose
    pub bind_12: usize,
    /// loose → free
    pub unbind_21: usize,
    /// loose → tight
    pub stroke_23: usize,
    /// tight → loose
    pub reverse_32: usize,
    /// tight → free
    pub detach_31: usize,
    /// Attempts that left the head where it was
    pub none: usize,
}

impl TransitionCounts {
    pub fn record(&mut self, transition: Option<XbTransition>) {
        match transition {
            Some(XbTransition::Bind) => self.bind_12 += 1,
            Some(XbTransition::Unbind) => self.unbind_21 += 1,
            Some(XbTransition::PowerStroke) => self.stroke_23 += 1,
            Some(XbTransition::ReverseStroke) => self.reverse_32 += 1,
            Some(XbTransition::Detach) => self.detach_31 += 1,
            None => self.none += 1,
        }
    }

    /// Attempts that changed a head's state
    pub fn total_transitions(&self) -> usize {
        self.bind_12 + self.unbind_21 + self.stroke_23 + self.reverse_32 + self.detach_31
    }

    pub fn total_attempts(&self) -> usize {
        self.total_transitions() + self.none
    }
}

impl AddAssign for TransitionCounts {
    fn add_assign(&mut self, other: Self) {
        self.bind_12 += other.bind_12;
        self.unbind_21 += other.unbind_21;
        self.stroke_23 += other.stroke_23;
        self.reverse_32 += other.reverse_32;
        self.detach_31 += other.detach_31;
        self.none += other.none;
    }
}

/// Summary of node displacements from construction positions (nm)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplacementStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std: f64,
}

impl DisplacementStats {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            std: var.sqrt(),
        }
    }
}

/// Observables after one timestep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestepMetrics {
    // === Timing ===
    pub timestep: usize,
    /// Simulated time (ms)
    pub time_ms: f64,

    // === Boundary conditions ===
    pub z_line_nm: f64,
    pub lattice_spacing_nm: f64,
    pub pCa: f64,

    // === Mechanics ===
    /// Pull on the M-line (pN)
    pub axial_force_pN: f64,
    /// Net radial force, y component (pN)
    pub radial_force_y_pN: f64,
    /// Net radial force, z component (pN)
    pub radial_force_z_pN: f64,
    /// Scalar sum of face radial forces (pN)
    pub radial_tension_pN: f64,
    /// Energy stored in bound heads (pN·nm)
    pub crossbridge_energy_pN_nm: f64,

    // === Kinetics ===
    pub xb_fraction_free: f64,
    pub xb_fraction_loose: f64,
    pub xb_fraction_tight: f64,
    pub transitions: TransitionCounts,
    pub tm_fraction_active: f64,
    pub actin_permissiveness_mean: f64,

    // === Displacements ===
    /// Over every crown of every thick filament
    pub thick_displacement: DisplacementStats,
    /// Over every node of every thin filament
    pub thin_displacement: DisplacementStats,
    /// One entry per thick filament, in filament order
    pub thick_displacements: Vec<DisplacementStats>,
    /// One entry per thin filament, in filament order
    pub thin_displacements: Vec<DisplacementStats>,
}

impl TimestepMetrics {
    pub fn from_lattice(lattice: &Lattice) -> Self {
        let [free, loose, tight] = lattice.crossbridge_state_fractions();
        let radial = lattice.radial_force();
        Self {
            timestep: lattice.current_timestep(),
            time_ms: lattice.elapsed_ms(),
            z_line_nm: lattice.z_line_nm(),
            lattice_spacing_nm: lattice.lattice_spacing_nm(),
            pCa: lattice.pCa(),
            axial_force_pN: lattice.axial_force(),
            radial_force_y_pN: radial.x,
            radial_force_z_pN: radial.y,
            radial_tension_pN: lattice.radial_tension(),
            crossbridge_energy_pN_nm: lattice.total_crossbridge_energy(),
            xb_fraction_free: free,
            xb_fraction_loose: loose,
            xb_fraction_tight: tight,
            transitions: lattice.transitions,
            tm_fraction_active: lattice.tm_state_fractions()[2],
            actin_permissiveness_mean: lattice.mean_permissiveness(),
            thick_displacement: DisplacementStats::from_values(
                lattice.thick().iter().flat_map(|t| t.displacements()),
            ),
            thin_displacement: DisplacementStats::from_values(
                lattice.thin().iter().flat_map(|t| t.displacements()),
            ),
            thick_displacements: lattice
                .thick()
                .iter()
                .map(|t| DisplacementStats::from_values(t.displacements()))
                .collect(),
            thin_displacements: lattice
                .thin()
                .iter()
                .map(|t| DisplacementStats::from_values(t.displacements()))
                .collect(),
        }
    }

    /// Fractions of free, loose and tight heads
    pub fn xb_fractions(&self) -> [f64; 3] {
        [self.xb_fraction_free, self.xb_fraction_loose, self.xb_fraction_tight]
    }
}
