//! A myosin head mounted on a thick-filament crown.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::address::{SiteId, XbId};
use crate::physics::XbState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossbridge {
    pub address: XbId,
    /// Crown (thick node) the head is mounted on
    pub crown: usize,
    pub state: XbState,
    /// Binding site held while loose or tight
    pub bound_to: Option<SiteId>,
}

impl Crossbridge {
    pub fn new(address: XbId, crown: usize) -> Self {
        Self {
            address,
            crown,
            state: XbState::Free,
            bound_to: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound_to.is_some()
    }

    /// Site this head is attached to
    ///
    /// # Panics
    ///
    /// If the head is free. Asking an unbound head for its site is a bug in
    /// the caller.
    pub fn bound_site(&self) -> SiteId {
        match self.bound_to {
            Some(site) => site,
            None => panic!("cross-bridge {:?} is unbound", self.address),
        }
    }
}

/// Separation from a crown to an actin node: (axial offset, lattice spacing)
pub fn separation(crown_nm: f64, site_nm: f64, lattice_spacing_nm: f64) -> DVec2 {
    DVec2::new(site_nm - crown_nm, lattice_spacing_nm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_crossbridge_free() {
        let xb = Crossbridge::new(XbId { thick: 0, face: 1, index: 2 }, 5);
        assert_eq!(xb.state, XbState::Free);
        assert!(!xb.is_bound());
    }

    #[test]
    #[should_panic(expected = "unbound")]
    fn test_bound_site_of_free_head_panics() {
        let xb = Crossbridge::new(XbId { thick: 0, face: 0, index: 0 }, 0);
        xb.bound_site();
    }

    #[test]
    fn test_separation_points_toward_site() {
        let sep = separation(900.0, 910.0, 14.0);
        assert_eq!(sep, DVec2::new(10.0, 14.0));
    }
}
