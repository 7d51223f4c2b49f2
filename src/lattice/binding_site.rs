//! An actin binding site and its tropomyosin regulatory state.

use serde::{Deserialize, Serialize};

use super::address::{SiteId, XbId};
use super::tropomyosin::TmState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSite {
    pub address: SiteId,
    /// Thin-filament node this site sits on
    pub node: usize,
    pub tm_state: TmState,
    /// Cross-bridge attached here, if any
    pub bound_to: Option<XbId>,
}

impl BindingSite {
    pub fn new(address: SiteId, node: usize) -> Self {
        Self {
            address,
            node,
            tm_state: TmState::Inactive,
            bound_to: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound_to.is_some()
    }

    /// Availability to myosin, 0 to 1
    ///
    /// Only fully active regulatory units expose the site; the lattice-wide
    /// `actin_permissiveness` scales the result.
    pub fn permissiveness(&self, actin_permissiveness: f64) -> f64 {
        self.tm_state.binding_influence() * actin_permissiveness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(state: TmState) -> BindingSite {
        BindingSite {
            tm_state: state,
            ..BindingSite::new(SiteId { thin: 0, face: 0, index: 0 }, 0)
        }
    }

    #[test]
    fn test_only_active_sites_permit_binding() {
        assert_eq!(site(TmState::Inactive).permissiveness(1.0), 0.0);
        assert_eq!(site(TmState::Primed).permissiveness(1.0), 0.0);
        assert_eq!(site(TmState::Active).permissiveness(1.0), 1.0);
    }

    #[test]
    fn test_global_factor_scales_permissiveness() {
        assert!((site(TmState::Active).permissiveness(0.25) - 0.25).abs() < 1e-15);
        assert_eq!(site(TmState::Active).permissiveness(0.0), 0.0);
    }
}
