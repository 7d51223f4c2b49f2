//! Model constants with citation metadata.
//!
//! Every group loads from JSON and falls back to its literature defaults.
//! Rates are per millisecond unless a field name says otherwise.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level parameters container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Parameters {
    /// Myosin backbone geometry and stiffness
    pub thick: ThickParameters,
    /// Actin backbone geometry and stiffness
    pub thin: ThinParameters,
    /// Myosin head springs and kinetics
    pub head: HeadParameters,
    /// Titin force-extension fit
    pub titin: TitinParameters,
    /// Tropomyosin regulation kinetics
    pub tropomyosin: TropomyosinParameters,
    /// Force-balance solver controls
    pub settle: SettleParameters,
}

impl Parameters {
    /// Load parameters from JSON files, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir("data/parameters")
    }

    /// Load parameters from specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            thick: ThickParameters::load_or_default(dir.join("thick.json")),
            thin: ThinParameters::load_or_default(dir.join("thin.json")),
            head: HeadParameters::load_or_default(dir.join("head.json")),
            titin: TitinParameters::load_or_default(dir.join("titin.json")),
            tropomyosin: TropomyosinParameters::load_or_default(dir.join("tropomyosin.json")),
            settle: SettleParameters::load_or_default(dir.join("settle.json")),
        }
    }

    /// Reject constants that would make the model meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("thick.bare_zone_nm", self.thick.bare_zone_nm),
            ("thick.crown_spacing_nm", self.thick.crown_spacing_nm),
            ("thick.stiffness_pN_per_nm", self.thick.stiffness_pN_per_nm),
            ("thin.node_spacing_nm", self.thin.node_spacing_nm),
            ("thin.stiffness_pN_per_nm", self.thin.stiffness_pN_per_nm),
            ("head.converter.stiffness_weak", self.head.converter.stiffness_weak),
            ("head.converter.stiffness_strong", self.head.converter.stiffness_strong),
            ("head.globular.stiffness_weak", self.head.globular.stiffness_weak),
            ("head.globular.stiffness_strong", self.head.globular.stiffness_strong),
            ("head.atp_M", self.head.atp_M),
            ("head.adp_M", self.head.adp_M),
            ("head.phosphate_M", self.head.phosphate_M),
            ("titin.rest_length_nm", self.titin.rest_length_nm),
            ("tropomyosin.K1", self.tropomyosin.K1),
            ("tropomyosin.K2", self.tropomyosin.K2),
            ("tropomyosin.K3", self.tropomyosin.K3),
            ("settle.tolerance_pN", self.settle.tolerance_pN),
        ];
        for (name, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        let counts = [
            ("thick.number_of_crowns", self.thick.number_of_crowns),
            ("thin.number_of_nodes", self.thin.number_of_nodes),
            ("settle.max_sweeps", self.settle.max_sweeps),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ConfigError::InvalidParameter { name, value: 0.0 });
            }
        }
        // Crowns alternate between two face triplets, binding sites cycle
        // through three faces.
        if self.thick.number_of_crowns % 2 != 0 {
            return Err(ConfigError::InvalidParameter {
                name: "thick.number_of_crowns",
                value: self.thick.number_of_crowns as f64,
            });
        }
        if self.thin.number_of_nodes % 3 != 0 {
            return Err(ConfigError::InvalidParameter {
                name: "thin.number_of_nodes",
                value: self.thin.number_of_nodes as f64,
            });
        }
        Ok(())
    }
}

/// Shared JSON loader: parse failures and missing files fall back to defaults
fn load_json_or_default<T, P>(path: P, label: &str) -> T
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("Loaded {} parameters from {:?}", label, path.as_ref());
                params
            }
            Err(e) => {
                log::warn!("Failed to parse {} parameters: {}, using defaults", label, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", label);
            T::default()
        }
    }
}

/// Thick (myosin) filament backbone
///
/// Reference: Tanner BCW, Daniel TL, Regnier M. PLoS Comput Biol, 2007.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThickParameters {
    /// Crowns per filament (3 heads each)
    pub number_of_crowns: usize,
    /// M-line to first crown (nm)
    pub bare_zone_nm: f64,
    /// Axial crown spacing (nm)
    /// Source: Millman, Physiol Rev 1998
    pub crown_spacing_nm: f64,
    /// Backbone stiffness between crowns (pN/nm)
    /// Source: Tanner et al. 2007
    pub stiffness_pN_per_nm: f64,
}

impl ThickParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "thick filament")
    }
}

impl Default for ThickParameters {
    fn default() -> Self {
        Self {
            number_of_crowns: 60,
            bare_zone_nm: 58.0,
            // Millman 1998
            crown_spacing_nm: 14.3,
            // Tanner et al. 2007
            stiffness_pN_per_nm: 2020.0,
        }
    }
}

/// Thin (actin) filament backbone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinParameters {
    /// Binding-site nodes per filament
    pub number_of_nodes: usize,
    /// Axial spacing between adjacent nodes (nm)
    pub node_spacing_nm: f64,
    /// Backbone stiffness between nodes (pN/nm)
    /// Source: Tanner et al. 2007
    pub stiffness_pN_per_nm: f64,
}

impl ThinParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "thin filament")
    }
}

impl Default for ThinParameters {
    fn default() -> Self {
        Self {
            number_of_nodes: 90,
            node_spacing_nm: 12.3,
            // Tanner et al. 2007
            stiffness_pN_per_nm: 1743.0,
        }
    }
}

/// One linear spring with weak (free/loose) and strong (tight) settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParameters {
    /// Rest value in the weakly bound states (nm or rad)
    pub rest_weak: f64,
    /// Rest value in the strongly bound state (nm or rad)
    pub rest_strong: f64,
    /// Stiffness in the weakly bound states (pN/nm or pN·nm/rad²)
    pub stiffness_weak: f64,
    /// Stiffness in the strongly bound state (pN/nm or pN·nm/rad²)
    pub stiffness_strong: f64,
}

/// Myosin head geometry and kinetic constants
///
/// Reference: Williams CD, Regnier M, Daniel TL. PLoS Comput Biol, 2010.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadParameters {
    /// Converter (lever) angle spring, radians
    pub converter: SpringParameters,
    /// Globular (neck length) spring, nm
    pub globular: SpringParameters,
    /// Peak binding rate at zero tip distance (1/ms)
    pub binding_rate_per_ms: f64,
    /// Fraction of the free energy drop released on weak binding
    pub alpha: f64,
    /// Fraction of the free energy drop released on the power stroke
    pub eta: f64,
    /// ATP concentration (M)
    pub atp_M: f64,
    /// ADP concentration (M)
    pub adp_M: f64,
    /// Inorganic phosphate concentration (M)
    pub phosphate_M: f64,
    /// Standard free energy of ATP hydrolysis (RT units)
    pub hydrolysis_standard_RT: f64,
    /// Cap on rejection-sampling draws when searching for a binding pose
    pub max_binding_draws: usize,
}

impl HeadParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "myosin head")
    }
}

impl Default for HeadParameters {
    fn default() -> Self {
        Self {
            // Williams et al. 2010
            converter: SpringParameters {
                rest_weak: 47.16_f64.to_radians(),
                rest_strong: 73.20_f64.to_radians(),
                stiffness_weak: 40.0,
                stiffness_strong: 40.0,
            },
            globular: SpringParameters {
                rest_weak: 19.93,
                rest_strong: 16.47,
                stiffness_weak: 2.0,
                stiffness_strong: 2.0,
            },
            binding_rate_per_ms: 72.0,
            alpha: 0.28,
            eta: 0.68,
            // Resting fibre, Pate & Cooke 1989
            atp_M: 5e-3,
            adp_M: 30e-6,
            phosphate_M: 3e-3,
            hydrolysis_standard_RT: 13.0,
            max_binding_draws: 10_000,
        }
    }
}

/// Titin exponential force-extension fit
///
/// Reference: Linke WA et al. J Mol Biol, 1998.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitinParameters {
    /// Length below which titin carries no force (nm)
    pub rest_length_nm: f64,
    /// Force prefactor (pN)
    pub a_pN: f64,
    /// Exponential stiffening constant (1/nm)
    pub b_per_nm: f64,
}

impl TitinParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "titin")
    }
}

impl Default for TitinParameters {
    fn default() -> Self {
        Self {
            rest_length_nm: 120.0,
            // Linke et al. 1998
            a_pN: 240.0,
            b_per_nm: 0.0045,
        }
    }
}

/// Three-state tropomyosin regulation
///
/// Reference: Tanner BCW, Daniel TL, Regnier M. PLoS Comput Biol, 2007.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TropomyosinParameters {
    /// Equilibrium constant of calcium binding (inactive/primed)
    pub K1: f64,
    /// Equilibrium constant of the closed to open shift (primed/active)
    pub K2: f64,
    /// Equilibrium constant of calcium release (active/inactive)
    pub K3: f64,
    /// Calcium binding rate constant (1/(M·s))
    pub k12_per_M_per_s: f64,
    /// Primed to active rate (1/s)
    pub k23_per_s: f64,
    /// Active to inactive rate (1/s)
    pub k31_per_s: f64,
    /// Cooperative span at zero tension, before halving (nm)
    pub span_base_nm: f64,
    /// Steepness of the span's tension dependence (1/pN)
    pub span_steepness: f64,
    /// Tension offset of the span's sigmoid (pN)
    pub span_force50_pN: f64,
}

impl TropomyosinParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "tropomyosin")
    }
}

impl Default for TropomyosinParameters {
    fn default() -> Self {
        Self {
            // Tanner et al. 2007
            K1: 1e5,
            K2: 10.0,
            K3: 1e6,
            k12_per_M_per_s: 5e5,
            k23_per_s: 10.0,
            k31_per_s: 5.0,
            // One tropomyosin span (37 nm) with 20% overlap
            span_base_nm: 37.0 * 1.2,
            span_steepness: 1.0,
            span_force50_pN: -20.0,
        }
    }
}

/// Force-balance solver controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleParameters {
    /// Convergence threshold on the largest nodal force (pN)
    pub tolerance_pN: f64,
    /// Relaxation sweeps allowed before giving up
    pub max_sweeps: usize,
    /// Finite-difference step for cross-bridge stiffness (nm)
    pub stiffness_step_nm: f64,
}

impl SettleParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "settle")
    }
}

impl Default for SettleParameters {
    fn default() -> Self {
        Self {
            tolerance_pN: 0.12,
            max_sweeps: 500,
            stiffness_step_nm: 1e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_validate() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_missing_directory_falls_back_to_defaults() {
        let params = Parameters::load_from_dir("does/not/exist");
        assert_eq!(params, Parameters::default());
    }

    #[test]
    fn test_head_angles_stored_in_radians() {
        let head = HeadParameters::default();
        assert!((head.converter.rest_weak - 0.8230972752405258).abs() < 1e-12);
        assert!(head.converter.rest_strong > head.converter.rest_weak);
    }

    #[test]
    fn test_odd_crown_count_rejected() {
        let mut params = Parameters::default();
        params.thick.number_of_crowns = 59;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidParameter { name: "thick.number_of_crowns", .. })
        ));
    }

    #[test]
    fn test_parameters_json_partial_override() {
        let json = r#"{"rest_length_nm": 100.0, "a_pN": 200.0, "b_per_nm": 0.01}"#;
        let titin: TitinParameters = serde_json::from_str(json).unwrap();
        assert_eq!(titin.rest_length_nm, 100.0);
        assert_eq!(titin.b_per_nm, 0.01);
    }
}
