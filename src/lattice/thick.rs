//! Thick (myosin) filament.
//!
//! A chain of crowns anchored at the M-line (x = 0) by the bare zone. Each
//! crown carries three myosin heads pointing at alternating face triplets,
//! so every one of the six faces sees a head on every second crown.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::address::{ThickFaceId, ThinFaceId, XbId};
use super::crossbridge::Crossbridge;
use super::topology::{self, THICK_FACE_COUNT};
use crate::config::ThickParameters;
use crate::physics::XbState;

/// Three heads sharing one axial node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crown {
    pub index: usize,
    pub crossbridges: [XbId; 3],
}

/// One side of the thick filament, facing a single thin face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThickFace {
    pub address: ThickFaceId,
    pub partner: ThinFaceId,
    /// Titin anchoring this face's tip
    pub titin: usize,
    pub crossbridges: Vec<Crossbridge>,
}

impl ThickFace {
    /// Unit (y, z) direction toward the partner thin filament
    pub fn direction(&self) -> DVec2 {
        topology::thick_face_direction(self.address.face)
    }

    pub fn bound_count(&self) -> usize {
        self.crossbridges.iter().filter(|xb| xb.is_bound()).count()
    }

    pub fn count_in_state(&self, state: XbState) -> usize {
        self.crossbridges.iter().filter(|xb| xb.state == state).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThickFilament {
    pub index: usize,
    /// Crown positions from the M-line (nm)
    pub axial: Vec<f64>,
    /// Positions at construction, for displacement tracking (nm)
    pub initial_axial: Vec<f64>,
    pub crowns: Vec<Crown>,
    pub faces: Vec<ThickFace>,
    pub bare_zone_nm: f64,
    pub crown_spacing_nm: f64,
    pub stiffness_pN_per_nm: f64,
}

impl ThickFilament {
    pub fn new(index: usize, params: &ThickParameters) -> Self {
        let n = params.number_of_crowns;
        let axial: Vec<f64> = (0..n)
            .map(|i| params.bare_zone_nm + i as f64 * params.crown_spacing_nm)
            .collect();

        let faces: Vec<ThickFace> = (0..THICK_FACE_COUNT)
            .map(|face| {
                let address = ThickFaceId { thick: index, face };
                let crossbridges = (0..n / 2)
                    .map(|i| {
                        Crossbridge::new(
                            XbId {
                                thick: index,
                                face,
                                index: i,
                            },
                            topology::crown_of(face, i),
                        )
                    })
                    .collect();
                ThickFace {
                    address,
                    partner: topology::thin_partner(address),
                    titin: index * THICK_FACE_COUNT + face,
                    crossbridges,
                }
            })
            .collect();

        let crowns = (0..n)
            .map(|crown| {
                let faces = topology::crown_faces(crown);
                let xb = |face: usize| XbId {
                    thick: index,
                    face,
                    index: crown / 2,
                };
                Crown {
                    index: crown,
                    crossbridges: [xb(faces[0]), xb(faces[1]), xb(faces[2])],
                }
            })
            .collect();

        Self {
            index,
            initial_axial: axial.clone(),
            axial,
            crowns,
            faces,
            bare_zone_nm: params.bare_zone_nm,
            crown_spacing_nm: params.crown_spacing_nm,
            stiffness_pN_per_nm: params.stiffness_pN_per_nm,
        }
    }

    pub fn number_of_crowns(&self) -> usize {
        self.axial.len()
    }

    /// Last crown, where titin attaches
    pub fn tip(&self) -> usize {
        self.axial.len() - 1
    }

    pub fn crossbridge(&self, id: XbId) -> &Crossbridge {
        &self.faces[id.face].crossbridges[id.index]
    }

    pub fn crossbridges(&self) -> impl Iterator<Item = &Crossbridge> {
        self.faces.iter().flat_map(|f| f.crossbridges.iter())
    }

    /// Backbone spring forces at every crown (pN)
    ///
    /// Crown 0 hangs off the M-line by the bare zone; the tip has no
    /// backbone neighbour toward the Z-line.
    pub fn backbone_forces(&self) -> Vec<f64> {
        let k = self.stiffness_pN_per_nm;
        let n = self.axial.len();
        (0..n)
            .map(|i| {
                let left = if i == 0 {
                    self.axial[0] - self.bare_zone_nm
                } else {
                    self.axial[i] - self.axial[i - 1] - self.crown_spacing_nm
                };
                let right = if i + 1 < n {
                    self.axial[i + 1] - self.axial[i] - self.crown_spacing_nm
                } else {
                    0.0
                };
                k * right - k * left
            })
            .collect()
    }

    /// Backbone contribution to the diagonal of the stiffness matrix
    pub fn backbone_diagonal(&self) -> Vec<f64> {
        let k = self.stiffness_pN_per_nm;
        let n = self.axial.len();
        (0..n).map(|i| if i + 1 < n { 2.0 * k } else { k }).collect()
    }

    /// Pull of the filament on the M-line (pN), positive toward the Z-line
    pub fn effective_axial_force(&self) -> f64 {
        self.stiffness_pN_per_nm * (self.axial[0] - self.bare_zone_nm)
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

    fn filament() -> ThickFilament {
        ThickFilament::new(2, &ThickParameters::default())
    }

    #[test]
    fn test_thick_layout() {
        let thick = filament();
        assert_eq!(thick.number_of_crowns(), 60);
        assert_eq!(thick.faces.len(), 6);
        assert!(thick.faces.iter().all(|f| f.crossbridges.len() == 30));
        assert!((thick.axial[0] - 58.0).abs() < 1e-12);
        assert!((thick.axial[59] - (58.0 + 59.0 * 14.3)).abs() < 1e-9);
    }

    #[test]
    fn test_crowns_reference_their_heads() {
        let thick = filament();
        for crown in &thick.crowns {
            for id in crown.crossbridges {
                assert_eq!(thick.crossbridge(id).crown, crown.index);
                assert_eq!(id.thick, 2);
            }
        }
    }

    #[test]
    fn test_rest_filament_is_force_free() {
        let thick = filament();
        assert!(thick.backbone_forces().iter().all(|f| f.abs() < 1e-9));
        assert!(thick.effective_axial_force().abs() < 1e-9);
    }

    #[test]
    fn test_stretched_bare_zone_pulls_back() {
        let mut thick = filament();
        for x in thick.axial.iter_mut() {
            *x += 1.0;
        }
        let forces = thick.backbone_forces();
        assert!((forces[0] + 2020.0).abs() < 1e-6);
        assert!(forces[1..].iter().all(|f| f.abs() < 1e-6));
        assert!((thick.effective_axial_force() - 2020.0).abs() < 1e-6);
        assert!(thick.displacements().all(|d| (d - 1.0).abs() < 1e-12));
    }
}
