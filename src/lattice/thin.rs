//! Thin (actin) filament.
//!
//! A chain of binding-site nodes hanging from the Z-line. Node N-1 is tied
//! to the Z-line; node 0 is the free end reaching toward the M-line. Node
//! j belongs to face j mod 3, so each face has a regularly spaced row of
//! sites with its own tropomyosin strand.

use serde::{Deserialize, Serialize};

use super::address::{SiteId, ThickFaceId, ThinFaceId};
use super::binding_site::BindingSite;
use super::topology::{self, THIN_FACE_COUNT};
use crate::config::ThinParameters;

/// One side of the thin filament, facing a single thick face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinFace {
    pub address: ThinFaceId,
    pub partner: ThickFaceId,
    /// Sites in increasing node (and axial) order
    pub binding_sites: Vec<BindingSite>,
}

impl ThinFace {
    /// Index of the site closest to `x_nm`
    ///
    /// `axial` is the owning filament's node positions.
    pub fn nearest(&self, axial: &[f64], x_nm: f64) -> usize {
        nearest_site(&self.binding_sites, axial, x_nm)
    }

    pub fn bound_count(&self) -> usize {
        self.binding_sites.iter().filter(|s| s.is_bound()).count()
    }
}

/// Binary search for the site in `sites` closest to `x_nm`
///
/// `sites` must be in increasing axial order.
pub fn nearest_site(sites: &[BindingSite], axial: &[f64], x_nm: f64) -> usize {
    let above = sites.partition_point(|s| axial[s.node] < x_nm);
    if above == 0 {
        return 0;
    }
    if above == sites.len() {
        return sites.len() - 1;
    }
    let below_gap = x_nm - axial[sites[above - 1].node];
    let above_gap = axial[sites[above].node] - x_nm;
    if below_gap <= above_gap {
        above - 1
    } else {
        above
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinFilament {
    pub index: usize,
    /// Node positions from the M-line (nm)
    pub axial: Vec<f64>,
    /// Positions at construction, for displacement tracking (nm)
    pub initial_axial: Vec<f64>,
    pub faces: Vec<ThinFace>,
    pub node_spacing_nm: f64,
    pub stiffness_pN_per_nm: f64,
}

impl ThinFilament {
    pub fn new(index: usize, z_line_nm: f64, params: &ThinParameters) -> Self {
        let n = params.number_of_nodes;
        let axial: Vec<f64> = (0..n)
            .map(|j| z_line_nm - (n - j) as f64 * params.node_spacing_nm)
            .collect();

        let faces = (0..THIN_FACE_COUNT)
            .map(|face| {
                let address = ThinFaceId { thin: index, face };
                let binding_sites = (0..n)
                    .filter(|&node| topology::node_face(node) == face)
                    .enumerate()
                    .map(|(i, node)| {
                        BindingSite::new(
                            SiteId {
                                thin: index,
                                face,
                                index: i,
                            },
                            node,
                        )
                    })
                    .collect();
                ThinFace {
                    address,
                    partner: topology::thick_partner(address),
                    binding_sites,
                }
            })
            .collect();

        Self {
            index,
            initial_axial: axial.clone(),
            axial,
            faces,
            node_spacing_nm: params.node_spacing_nm,
            stiffness_pN_per_nm: params.stiffness_pN_per_nm,
        }
    }

    pub fn number_of_nodes(&self) -> usize {
        self.axial.len()
    }

    pub fn binding_site(&self, id: SiteId) -> &BindingSite {
        &self.faces[id.face].binding_sites[id.index]
    }

    pub fn binding_sites(&self) -> impl Iterator<Item = &BindingSite> {
        self.faces.iter().flat_map(|f| f.binding_sites.iter())
    }

    /// Tension in the backbone segment on the Z-line side of every node (pN)
    pub fn segment_tensions(&self, z_line_nm: f64) -> Vec<f64> {
        let k = self.stiffness_pN_per_nm;
        let s = self.node_spacing_nm;
        let n = self.axial.len();
        (0..n)
            .map(|j| {
                let next = if j + 1 < n { self.axial[j + 1] } else { z_line_nm };
                k * (next - self.axial[j] - s)
            })
            .collect()
    }

    /// Backbone spring forces at every node (pN)
    pub fn backbone_forces(&self, z_line_nm: f64) -> Vec<f64> {
        let tensions = self.segment_tensions(z_line_nm);
        (0..tensions.len())
            .map(|j| {
                let left = if j == 0 { 0.0 } else { tensions[j - 1] };
                tensions[j] - left
            })
            .collect()
    }

    /// Backbone contribution to the diagonal of the stiffness matrix
    pub fn backbone_diagonal(&self) -> Vec<f64> {
        let k = self.stiffness_pN_per_nm;
        (0..self.axial.len())
            .map(|j| if j == 0 { k } else { 2.0 * k })
            .collect()
    }

    pub fn displacements(&self) -> impl Iterator<Item = f64> + '_ {
        self.axial
            .iter()
            .zip(&self.initial_axial)
            .map(|(now, start)| now - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filament() -> ThinFilament {
        ThinFilament::new(5, 1250.0, &ThinParameters::default())
    }

    #[test]
    fn test_thin_layout() {
        let thin = filament();
        assert_eq!(thin.number_of_nodes(), 90);
        assert!(thin.faces.iter().all(|f| f.binding_sites.len() == 30));
        assert!((thin.axial[89] - (1250.0 - 12.3)).abs() < 1e-9);
        assert!((thin.axial[0] - (1250.0 - 90.0 * 12.3)).abs() < 1e-9);
        for face in &thin.faces {
            for (i, site) in face.binding_sites.iter().enumerate() {
                assert_eq!(site.address.index, i);
                assert_eq!(site.node % 3, face.address.face);
            }
        }
    }

    #[test]
    fn test_rest_filament_is_force_free() {
        let thin = filament();
        assert!(thin.backbone_forces(1250.0).iter().all(|f| f.abs() < 1e-9));
    }

    #[test]
    fn test_nearest_site_binary_search() {
        let thin = filament();
        let face = &thin.faces[1];
        for (i, site) in face.binding_sites.iter().enumerate() {
            let x = thin.axial[site.node];
            assert_eq!(face.nearest(&thin.axial, x + 1.0), i);
            assert_eq!(face.nearest(&thin.axial, x - 1.0), i);
        }
        assert_eq!(face.nearest(&thin.axial, -1e6), 0);
        assert_eq!(face.nearest(&thin.axial, 1e6), 29);
    }

    #[test]
    fn test_z_line_pull_loads_last_segment() {
        let thin = filament();
        let tensions = thin.segment_tensions(1251.0);
        assert!((tensions[89] - 1743.0).abs() < 1e-6);
        assert!(tensions[..89].iter().all(|t| t.abs() < 1e-6));
    }
}
