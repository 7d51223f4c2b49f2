//! Run inputs: initial lattice scalars and optional per-timestep traces.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Initial conditions and externally driven values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Face-to-face filament spacing (nm)
    pub lattice_spacing_nm: f64,
    /// M-line to Z-line distance (nm)
    pub z_line_nm: f64,
    /// Calcium concentration as -log10([Ca²⁺])
    pub pCa: f64,
    /// Duration of one timestep (ms)
    pub timestep_len_ms: f64,
    /// Global multiplier on binding-site permissiveness, 0 to 1
    pub actin_permissiveness: f64,
    /// Exponent coupling lattice spacing to z-line length, 0 disables
    pub poisson_ratio: f64,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Per-timestep overrides
    #[serde(default)]
    pub time_dependence: TimeDependence,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            lattice_spacing_nm: 14.0,
            z_line_nm: 1250.0,
            pCa: 4.0,
            timestep_len_ms: 1.0,
            actin_permissiveness: 1.0,
            poisson_ratio: 0.0,
            seed: None,
            time_dependence: TimeDependence::default(),
        }
    }
}

/// Optional traces, indexed by timestep; all present traces share a length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeDependence {
    #[serde(default)]
    pub lattice_spacing_nm: Option<Vec<f64>>,
    #[serde(default)]
    pub z_line_nm: Option<Vec<f64>>,
    #[serde(default)]
    pub pCa: Option<Vec<f64>>,
    #[serde(default)]
    pub actin_permissiveness: Option<Vec<f64>>,
}

/// Overrides for a single timestep
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub lattice_spacing_nm: Option<f64>,
    pub z_line_nm: Option<f64>,
    pub pCa: Option<f64>,
    pub actin_permissiveness: Option<f64>,
}

impl TimeDependence {
    fn traces(&self) -> [(&'static str, Option<&Vec<f64>>); 4] {
        [
            ("lattice_spacing_nm", self.lattice_spacing_nm.as_ref()),
            ("z_line_nm", self.z_line_nm.as_ref()),
            ("pCa", self.pCa.as_ref()),
            ("actin_permissiveness", self.actin_permissiveness.as_ref()),
        ]
    }

    /// Shared length of the present traces, `None` when no trace is given
    pub fn len(&self) -> Option<usize> {
        self.traces().iter().find_map(|(_, t)| t.map(|t| t.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_none()
    }

    /// Values for `step`. Past the end of a trace its last value is held.
    pub fn at(&self, step: usize) -> Overrides {
        let pick = |trace: &Option<Vec<f64>>| {
            trace
                .as_ref()
                .and_then(|t| t.get(step).or_else(|| t.last()).copied())
        };
        Overrides {
            lattice_spacing_nm: pick(&self.lattice_spacing_nm),
            z_line_nm: pick(&self.z_line_nm),
            pCa: pick(&self.pCa),
            actin_permissiveness: pick(&self.actin_permissiveness),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let expected = self.len();
        for (name, trace) in self.traces() {
            let Some(trace) = trace else { continue };
            if trace.is_empty() {
                return Err(ConfigError::EmptyTrace { name });
            }
            if let Some(expected) = expected {
                if trace.len() != expected {
                    return Err(ConfigError::TraceLengthMismatch {
                        name,
                        len: trace.len(),
                        expected,
                    });
                }
            }
            for (step, &value) in trace.iter().enumerate() {
                if check_value(name, value).is_err() {
                    return Err(ConfigError::InvalidTraceValue { name, step, value });
                }
            }
        }
        Ok(())
    }
}

/// Range check shared by scalars and trace entries
fn check_value(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name, value });
    }
    match name {
        "actin_permissiveness" => {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        "poisson_ratio" => {
            if !(0.0..=0.5).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 0.5,
                });
            }
        }
        _ => {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
    }
    Ok(())
}

impl LatticeConfig {
    /// Check every scalar and trace before a lattice is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_value("lattice_spacing_nm", self.lattice_spacing_nm)?;
        check_value("z_line_nm", self.z_line_nm)?;
        check_value("pCa", self.pCa)?;
        check_value("timestep_len_ms", self.timestep_len_ms)?;
        check_value("actin_permissiveness", self.actin_permissiveness)?;
        check_value("poisson_ratio", self.poisson_ratio)?;
        self.time_dependence.validate()
    }

    /// Calcium concentration (M)
    pub fn calcium_M(&self) -> f64 {
        10f64.powf(-self.pCa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LatticeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_spacing_rejected() {
        let config = LatticeConfig {
            lattice_spacing_nm: -1.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "lattice_spacing_nm",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_nan_timestep_rejected() {
        let config = LatticeConfig {
            timestep_len_ms: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn test_mismatched_traces_rejected() {
        let config = LatticeConfig {
            time_dependence: TimeDependence {
                z_line_nm: Some(vec![1250.0, 1240.0, 1230.0]),
                pCa: Some(vec![4.0, 4.0]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TraceLengthMismatch {
                name: "pCa",
                len: 2,
                expected: 3
            })
        );
    }

    #[test]
    fn test_out_of_range_trace_entry_rejected() {
        let config = LatticeConfig {
            time_dependence: TimeDependence {
                actin_permissiveness: Some(vec![1.0, 0.5, 1.5]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTraceValue {
                name: "actin_permissiveness",
                step: 2,
                value: 1.5
            })
        );
    }

    #[test]
    fn test_trace_holds_last_value() {
        let td = TimeDependence {
            pCa: Some(vec![9.0, 6.0, 4.0]),
            ..Default::default()
        };
        assert_eq!(td.at(1).pCa, Some(6.0));
        assert_eq!(td.at(10).pCa, Some(4.0));
        assert_eq!(td.at(1).z_line_nm, None);
        assert_eq!(td.len(), Some(3));
    }

    #[test]
    fn test_calcium_from_pca() {
        let config = LatticeConfig {
            pCa: 5.0,
            ..Default::default()
        };
        assert!((config.calcium_M() - 1e-5).abs() < 1e-18);
    }
}
