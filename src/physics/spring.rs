//! Two-state linear spring.
//!
//! Each myosin head carries two of these: the converter angle and the
//! globular (neck) length. A spring has one rest value and stiffness while
//! the head is weakly attached or detached and another once it is
//! strongly bound.
//!
//! E = ½ k (v - r)²
//!
//! Thermal fluctuations follow equipartition in the weak state:
//! v ~ Normal(r_weak, sqrt(k_B*T / k_weak)).

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::SpringParameters;

/// Boltzmann constant times temperature at 288 K in pN·nm
/// k_B*T = 1.381e-23 J/K * 288 K = 3.977e-21 J = 3.977 pN·nm
pub const KB_T_PN_NM: f64 = 1.381e-23 * 288.0 * 1e21;

/// Which set of constants a spring uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpringState {
    Weak,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    rest_weak: f64,
    rest_strong: f64,
    stiffness_weak: f64,
    stiffness_strong: f64,
    /// Standard deviation of the thermal distribution
    thermal_sd: f64,
}

impl Spring {
    pub fn new(params: &SpringParameters) -> Self {
        Self {
            rest_weak: params.rest_weak,
            rest_strong: params.rest_strong,
            stiffness_weak: params.stiffness_weak,
            stiffness_strong: params.stiffness_strong,
            thermal_sd: (KB_T_PN_NM / params.stiffness_weak).sqrt(),
        }
    }

    pub fn rest(&self, state: SpringState) -> f64 {
        match state {
            SpringState::Weak => self.rest_weak,
            SpringState::Strong => self.rest_strong,
        }
    }

    pub fn stiffness(&self, state: SpringState) -> f64 {
        match state {
            SpringState::Weak => self.stiffness_weak,
            SpringState::Strong => self.stiffness_strong,
        }
    }

    /// Stored energy at `value` (pN·nm)
    pub fn energy(&self, value: f64, state: SpringState) -> f64 {
        let dx = value - self.rest(state);
        0.5 * self.stiffness(state) * dx * dx
    }

    /// Restoring term k (v - r)
    pub fn displacement_force(&self, value: f64, state: SpringState) -> f64 {
        self.stiffness(state) * (value - self.rest(state))
    }

    pub fn thermal_sd(&self) -> f64 {
        self.thermal_sd
    }

    /// Draw a value from the weak-state thermal distribution
    pub fn sample_thermal_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.rest_weak + self.thermal_sd * z
    }
}
