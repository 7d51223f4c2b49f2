//! Tropomyosin/troponin regulation of actin binding sites.
//!
//! Each regulatory unit cycles through three states
//!
//!   Tm+Tn+Ca <-K1-> Tm+Tn.Ca <-K2-> Tm.Tn.Ca <-K3-> Tm+Tn+Ca
//!   inactive         primed           active
//!
//! with forward rates k12 (calcium dependent), k23, k31 and reverse rates
//! r = k / K. An active unit under a bound myosin head is held in place.
//! After every unit has had its chance to move, activation spreads along
//! the strand: inactive units within a tension-dependent span of an active
//! one become primed.
//!
//!   span = ½ · base · (1 - tanh(steep · (f50 + T)))
//!
//! Reference: Tanner BCW, Daniel TL, Regnier M. PLoS Comput Biol, 2007

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::binding_site::BindingSite;
use crate::config::TropomyosinParameters;
use crate::physics::rate_to_probability;

const MS_PER_S: f64 = 1e-3;

/// Regulatory state of one binding site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TmState {
    Inactive,
    Primed,
    Active,
}

impl TmState {
    pub const ALL: [TmState; 3] = [TmState::Inactive, TmState::Primed, TmState::Active];

    pub fn index(self) -> usize {
        match self {
            TmState::Inactive => 0,
            TmState::Primed => 1,
            TmState::Active => 2,
        }
    }

    /// Contribution of this state to binding permissiveness
    pub fn binding_influence(self) -> f64 {
        match self {
            TmState::Inactive | TmState::Primed => 0.0,
            TmState::Active => 1.0,
        }
    }

    fn forward(self) -> TmState {
        match self {
            TmState::Inactive => TmState::Primed,
            TmState::Primed => TmState::Active,
            TmState::Active => TmState::Inactive,
        }
    }

    fn backward(self) -> TmState {
        match self {
            TmState::Inactive => TmState::Active,
            TmState::Primed => TmState::Inactive,
            TmState::Active => TmState::Primed,
        }
    }
}

/// Transition rates at one calcium level (1/ms)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TmRates {
    pub r12: f64,
    pub r21: f64,
    pub r23: f64,
    pub r32: f64,
    pub r31: f64,
    pub r13: f64,
}

impl TmRates {
    /// (forward, backward) rates out of `state`
    pub fn out_of(&self, state: TmState) -> (f64, f64) {
        match state {
            TmState::Inactive => (self.r12, self.r13),
            TmState::Primed => (self.r23, self.r21),
            TmState::Active => (self.r31, self.r32),
        }
    }
}

/// Shared regulatory kinetics for every tropomyosin strand
#[derive(Debug, Clone, PartialEq)]
pub struct TmKinetics {
    params: TropomyosinParameters,
}

impl TmKinetics {
    pub fn new(params: &TropomyosinParameters) -> Self {
        Self {
            params: params.clone(),
        }
    }

    pub fn rates(&self, calcium_M: f64) -> TmRates {
        let p = &self.params;
        let r12 = p.k12_per_M_per_s * MS_PER_S * calcium_M;
        let r23 = p.k23_per_s * MS_PER_S;
        let r31 = p.k31_per_s * MS_PER_S;
        TmRates {
            r12,
            r21: r12 / p.K1,
            r23,
            r32: r23 / p.K2,
            r31,
            r13: r31 / p.K3,
        }
    }

    /// Cooperative span around an active site under tension `tension_pN`
    pub fn span(&self, tension_pN: f64) -> f64 {
        let p = &self.params;
        0.5 * p.span_base_nm * (1.0 - (p.span_steepness * (p.span_force50_pN + tension_pN)).tanh())
    }

    /// Next state for one site using a single uniform draw
    ///
    /// Moves forward if the draw is below p_f, backward if it is above
    /// 1 - p_b. A bound active site keeps its state.
    pub fn transition<R: Rng + ?Sized>(
        &self,
        state: TmState,
        bound: bool,
        rates: &TmRates,
        dt_ms: f64,
        rng: &mut R,
    ) -> TmState {
        let draw: f64 = rng.gen();
        if state == TmState::Active && bound {
            return state;
        }
        let (forward, backward) = rates.out_of(state);
        let p_forward = rate_to_probability(forward, dt_ms);
        let p_backward = rate_to_probability(backward, dt_ms);
        if draw < p_forward {
            state.forward()
        } else if draw > 1.0 - p_backward {
            state.backward()
        } else {
            state
        }
    }

    /// Transition every site on one strand, then spread activation
    ///
    /// `axial` and `tension` are indexed by thin-filament node. Returns the
    /// number of sites whose state changed.
    pub fn step_strand<R: Rng + ?Sized>(
        &self,
        sites: &mut [BindingSite],
        axial: &[f64],
        tension: &[f64],
        rates: &TmRates,
        dt_ms: f64,
        rng: &mut R,
    ) -> usize {
        let mut changed = 0;
        for site in sites.iter_mut() {
            let next = self.transition(site.tm_state, site.is_bound(), rates, dt_ms, rng);
            if next != site.tm_state {
                site.tm_state = next;
                changed += 1;
            }
        }
        changed + self.spread(sites, axial, tension)
    }

    /// Raise inactive sites near active ones to primed
    ///
    /// Spans are measured from the state after the transition pass; raised
    /// sites do not spread further this step.
    pub fn spread(&self, sites: &mut [BindingSite], axial: &[f64], tension: &[f64]) -> usize {
        let reaches: Vec<(f64, f64)> = sites
            .iter()
            .filter(|s| s.tm_state == TmState::Active)
            .map(|s| (axial[s.node], self.span(tension[s.node])))
            .collect();
        if reaches.is_empty() {
            return 0;
        }
        let mut raised = 0;
        for site in sites.iter_mut().filter(|s| s.tm_state == TmState::Inactive) {
            let x = axial[site.node];
            if reaches.iter().any(|&(center, span)| (x - center).abs() < span) {
                site.tm_state = TmState::Primed;
                raised += 1;
            }
        }
        raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::address::{SiteId, XbId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn kinetics() -> TmKinetics {
        TmKinetics::new(&TropomyosinParameters::default())
    }

    fn strand(n: usize) -> (Vec<BindingSite>, Vec<f64>, Vec<f64>) {
        let sites = (0..n)
            .map(|i| BindingSite::new(SiteId { thin: 0, face: 0, index: i }, i))
            .collect();
        let axial = (0..n).map(|i| 36.9 * i as f64).collect();
        (sites, axial, vec![0.0; n])
    }

    #[test]
    fn test_rates_follow_equilibrium_constants() {
        let rates = kinetics().rates(1e-4);
        assert!((rates.r12 - 0.05).abs() < 1e-12);
        assert!((rates.r21 - 0.05 / 1e5).abs() < 1e-18);
        assert!((rates.r23 - 0.01).abs() < 1e-15);
        assert!((rates.r32 - 0.001).abs() < 1e-15);
        assert!((rates.r31 - 0.005).abs() < 1e-15);
        assert!((rates.r13 - 0.005 / 1e6).abs() < 1e-18);
    }

    #[test]
    fn test_span_shrinks_with_tension() {
        let k = kinetics();
        let relaxed = k.span(0.0);
        assert!((relaxed - 44.4).abs() < 1e-6, "span {}", relaxed);
        assert!((k.span(20.0) - 22.2).abs() < 1e-9);
        assert!(k.span(40.0) < 1e-6);
    }

    #[test]
    fn test_bound_active_site_holds() {
        let k = kinetics();
        let rates = TmRates {
            r12: 1e9,
            r21: 1e9,
            r23: 1e9,
            r32: 1e9,
            r31: 1e9,
            r13: 1e9,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(
                k.transition(TmState::Active, true, &rates, 1.0, &mut rng),
                TmState::Active
            );
        }
    }

    #[test]
    fn test_certain_forward_transition() {
        let k = kinetics();
        let rates = TmRates {
            r12: 1e9,
            r21: 0.0,
            r23: 0.0,
            r32: 0.0,
            r31: 0.0,
            r13: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let next = k.transition(TmState::Inactive, false, &rates, 1.0, &mut rng);
        assert_eq!(next, TmState::Primed);
    }

    #[test]
    fn test_spread_raises_neighbours_only() {
        let k = kinetics();
        let (mut sites, axial, tension) = strand(7);
        sites[3].tm_state = TmState::Active;
        let raised = k.spread(&mut sites, &axial, &tension);
        assert_eq!(raised, 2);
        assert_eq!(sites[2].tm_state, TmState::Primed);
        assert_eq!(sites[4].tm_state, TmState::Primed);
        assert_eq!(sites[1].tm_state, TmState::Inactive);
        assert_eq!(sites[5].tm_state, TmState::Inactive);
    }

    #[test]
    fn test_spread_never_demotes() {
        let k = kinetics();
        let (mut sites, axial, tension) = strand(5);
        sites[0].tm_state = TmState::Active;
        sites[1].tm_state = TmState::Active;
        sites[1].bound_to = Some(XbId { thick: 0, face: 0, index: 0 });
        sites[4].tm_state = TmState::Primed;
        k.spread(&mut sites, &axial, &tension);
        assert_eq!(sites[0].tm_state, TmState::Active);
        assert_eq!(sites[1].tm_state, TmState::Active);
        assert_eq!(sites[4].tm_state, TmState::Primed);
    }

    #[test]
    fn test_tension_suppresses_spread() {
        let k = kinetics();
        let (mut sites, axial, _) = strand(5);
        sites[2].tm_state = TmState::Active;
        let taut = vec![40.0; 5];
        assert_eq!(k.spread(&mut sites, &axial, &taut), 0);
    }
}
