//! Myosin head kinetics.
//!
//! A head is a lever (converter angle spring, c) and a neck (globular
//! length spring, g) anchored at a thick-filament crown. Given the
//! separation (x, y) from the crown to an actin site, the head's pose is
//!
//!   c = atan2(y, x),  g = sqrt(x² + y²)
//!
//! and the forces it exerts are
//!
//!   f_x = k_g (g - g_s) cos c + (1/g) k_c (c - c_s) sin c
//!   f_y = k_g (g - g_s) sin c + (1/g) k_c (c - c_s) cos c
//!
//! The three-state cycle (free → loose → tight → free, with reverse steps
//! loose → free and tight → loose) uses energy-dependent rates per
//! millisecond.
//!
//! References:
//! - Tanner BCW, Daniel TL, Regnier M. PLoS Comput Biol, 2007
//! - Williams CD, Regnier M, Daniel TL. PLoS Comput Biol, 2010

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spring::{Spring, SpringState};
use crate::config::HeadParameters;

/// Cross-bridge chemical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XbState {
    /// Detached
    Free,
    /// Weakly bound, pre-power-stroke
    Loose,
    /// Strongly bound, post-power-stroke
    Tight,
}

impl XbState {
    pub const ALL: [XbState; 3] = [XbState::Free, XbState::Loose, XbState::Tight];

    pub fn spring_state(self) -> SpringState {
        match self {
            XbState::Free | XbState::Loose => SpringState::Weak,
            XbState::Tight => SpringState::Strong,
        }
    }

    pub fn is_bound(self) -> bool {
        self != XbState::Free
    }

    /// 0, 1 or 2
    pub fn index(self) -> usize {
        match self {
            XbState::Free => 0,
            XbState::Loose => 1,
            XbState::Tight => 2,
        }
    }
}

/// One edge of the head's state graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XbTransition {
    /// free → loose ("12")
    Bind,
    /// loose → free ("21")
    Unbind,
    /// loose → tight ("23")
    PowerStroke,
    /// tight → loose ("32")
    ReverseStroke,
    /// tight → free ("31")
    Detach,
}

impl XbTransition {
    pub fn code(self) -> &'static str {
        match self {
            XbTransition::Bind => "12",
            XbTransition::Unbind => "21",
            XbTransition::PowerStroke => "23",
            XbTransition::ReverseStroke => "32",
            XbTransition::Detach => "31",
        }
    }

    pub fn from_state(self) -> XbState {
        match self {
            XbTransition::Bind => XbState::Free,
            XbTransition::Unbind | XbTransition::PowerStroke => XbState::Loose,
            XbTransition::ReverseStroke | XbTransition::Detach => XbState::Tight,
        }
    }

    pub fn to_state(self) -> XbState {
        match self {
            XbTransition::Bind | XbTransition::ReverseStroke => XbState::Loose,
            XbTransition::Unbind | XbTransition::Detach => XbState::Free,
            XbTransition::PowerStroke => XbState::Tight,
        }
    }

    /// Transitions that break the link to the actin site
    pub fn releases(self) -> bool {
        matches!(self, XbTransition::Unbind | XbTransition::Detach)
    }
}

/// Convert a rate (1/ms) into the chance of firing within `dt_ms`
///
/// p = 1 - exp(-rate·Δt), always in [0, 1]. Non-positive or NaN rates
/// never fire.
pub fn rate_to_probability(rate_per_ms: f64, dt_ms: f64) -> f64 {
    if !(rate_per_ms > 0.0) || !(dt_ms > 0.0) {
        return 0.0;
    }
    (1.0 - (-rate_per_ms * dt_ms).exp()).clamp(0.0, 1.0)
}

/// Shared kinetic model for every head in the lattice
#[derive(Debug, Clone, PartialEq)]
pub struct HeadKinetics {
    converter: Spring,
    globular: Spring,
    binding_rate_per_ms: f64,
    /// Free energy released on weak binding (RT)
    alpha_dg: f64,
    /// Free energy released through the power stroke (RT)
    eta_dg: f64,
    max_binding_draws: usize,
}

impl HeadKinetics {
    pub fn new(params: &HeadParameters) -> Self {
        let delta_g = (-params.hydrolysis_standard_RT
            - (params.atp_M / (params.adp_M * params.phosphate_M)).ln())
        .abs();
        Self {
            converter: Spring::new(&params.converter),
            globular: Spring::new(&params.globular),
            binding_rate_per_ms: params.binding_rate_per_ms,
            alpha_dg: params.alpha * -delta_g,
            eta_dg: params.eta * -delta_g,
            max_binding_draws: params.max_binding_draws,
        }
    }

    /// Lever angle and neck length for a crown-to-site separation
    pub fn pose(separation: DVec2) -> (f64, f64) {
        (separation.y.atan2(separation.x), separation.length())
    }

    /// (axial, radial) force exerted through the head (pN)
    pub fn force(&self, state: XbState, separation: DVec2) -> DVec2 {
        let s = state.spring_state();
        let (c, g) = Self::pose(separation);
        let neck = self.globular.displacement_force(g, s);
        let lever = self.converter.displacement_force(c, s) / g;
        let (sin_c, cos_c) = c.sin_cos();
        DVec2::new(neck * cos_c + lever * sin_c, neck * sin_c + lever * cos_c)
    }

    pub fn axial_force(&self, state: XbState, separation: DVec2) -> f64 {
        self.force(state, separation).x
    }

    pub fn radial_force(&self, state: XbState, separation: DVec2) -> f64 {
        self.force(state, separation).y
    }

    /// d(f_x)/dx by central difference, floored at zero
    pub fn axial_stiffness(&self, state: XbState, separation: DVec2, step_nm: f64) -> f64 {
        let dx = DVec2::new(step_nm, 0.0);
        let slope = (self.axial_force(state, separation + dx)
            - self.axial_force(state, separation - dx))
            / (2.0 * step_nm);
        if slope.is_finite() {
            slope.max(0.0)
        } else {
            0.0
        }
    }

    /// Elastic energy stored in both springs (pN·nm)
    pub fn energy(&self, state: XbState, separation: DVec2) -> f64 {
        let s = state.spring_state();
        let (c, g) = Self::pose(separation);
        self.converter.energy(c, s) + self.globular.energy(g, s)
    }

    /// Free energy of a state at this separation (RT units)
    pub fn free_energy(&self, state: XbState, separation: DVec2) -> f64 {
        match state {
            XbState::Free => 0.0,
            XbState::Loose => self.alpha_dg + self.energy(XbState::Loose, separation),
            XbState::Tight => self.eta_dg + self.energy(XbState::Tight, separation),
        }
    }

    /// Binding rate (1/ms) from one thermally sampled head pose
    ///
    /// Poses are redrawn until the tip sits on the crown's side of the
    /// thin filament. If no such pose turns up within the draw budget the
    /// rate is zero.
    pub fn binding_rate<R: Rng + ?Sized>(
        &self,
        separation: DVec2,
        permissiveness: f64,
        rng: &mut R,
    ) -> f64 {
        for _ in 0..self.max_binding_draws {
            let c = self.converter.sample_thermal_value(rng);
            let g = self.globular.sample_thermal_value(rng);
            let tip = DVec2::new(g * c.cos(), g * c.sin());
            if separation.y >= tip.y {
                let distance = (separation - tip).length();
                return self.binding_rate_per_ms * (-distance * distance).exp() * permissiveness;
            }
        }
        log::debug!(
            "No binding pose within {} draws at separation {:?}",
            self.max_binding_draws,
            separation
        );
        0.0
    }

    /// loose → free, detailed balance against a fresh binding sample
    pub fn unbind_rate<R: Rng + ?Sized>(
        &self,
        separation: DVec2,
        permissiveness: f64,
        rng: &mut R,
    ) -> f64 {
        let g_free = self.free_energy(XbState::Free, separation);
        let g_loose = self.free_energy(XbState::Loose, separation);
        self.binding_rate(separation, permissiveness, rng) / (g_free - g_loose).exp()
    }

    /// loose → tight
    pub fn power_stroke_rate(&self, separation: DVec2) -> f64 {
        let e_loose = self.energy(XbState::Loose, separation);
        let e_tight = self.energy(XbState::Tight, separation);
        10.0 * (0.1 * (1.0 + (0.4 * (e_loose - e_tight) + 4.0).tanh()) + 0.001)
    }

    /// tight → loose
    pub fn reverse_stroke_rate(&self, separation: DVec2) -> f64 {
        let g_loose = self.free_energy(XbState::Loose, separation);
        let g_tight = self.free_energy(XbState::Tight, separation);
        self.power_stroke_rate(separation) / (g_loose - g_tight).exp()
    }

    /// tight → free
    pub fn detach_rate(&self, separation: DVec2) -> f64 {
        let e_tight = self.energy(XbState::Tight, separation);
        (0.01 * e_tight).sqrt() + 0.02
    }

    /// Attempt one transition from `state` using a single uniform draw
    pub fn transition<R: Rng + ?Sized>(
        &self,
        state: XbState,
        separation: DVec2,
        permissiveness: f64,
        dt_ms: f64,
        rng: &mut R,
    ) -> Option<XbTransition> {
        let check: f64 = rng.gen();
        let p = |rate: f64| rate_to_probability(rate, dt_ms);
        match state {
            XbState::Free => {
                if p(self.binding_rate(separation, permissiveness, rng)) > check {
                    return Some(XbTransition::Bind);
                }
            }
            XbState::Loose => {
                if p(self.power_stroke_rate(separation)) > check {
                    return Some(XbTransition::PowerStroke);
                }
                if p(self.unbind_rate(separation, permissiveness, rng)) > check {
                    return Some(XbTransition::Unbind);
                }
            }
            XbState::Tight => {
                if p(self.detach_rate(separation)) > check {
                    return Some(XbTransition::Detach);
                }
                if p(self.reverse_stroke_rate(separation)) > check {
                    return Some(XbTransition::ReverseStroke);
                }
            }
        }
        None
    }

    pub fn alpha_dg(&self) -> f64 {
        self.alpha_dg
    }

    pub fn eta_dg(&self) -> f64 {
        self.eta_dg
    }
}
