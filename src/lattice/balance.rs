//! Nodal forces and the per-filament linear systems used to settle the
//! lattice.
//!
//! Chains 0-3 are the thick filaments and 4-11 the thin filaments, the
//! same order [`Lattice::flatten_positions`] uses.

use crate::physics::{ChainSystem, Relaxable};

use super::crossbridge::{self, Crossbridge};
use super::Lattice;

impl Lattice {
    fn head_separation(&self, xb: &Crossbridge) -> glam::DVec2 {
        let site = xb.bound_site();
        crossbridge::separation(
            self.thick[xb.address.thick].axial[xb.crown],
            self.site_axial_nm(site),
            self.lattice_spacing_nm,
        )
    }

    /// Net axial force at every crown of thick filament `index` (pN)
    pub fn thick_forces(&self, index: usize) -> Vec<f64> {
        let thick = &self.thick[index];
        let mut forces = thick.backbone_forces();
        let tip = thick.tip();
        for face in &thick.faces {
            for xb in face.crossbridges.iter().filter(|xb| xb.is_bound()) {
                forces[xb.crown] += self.head.axial_force(xb.state, self.head_separation(xb));
            }
            forces[tip] += self.titin[face.titin].axial_force(
                self.z_line_nm,
                thick.axial[tip],
                self.lattice_spacing_nm,
            );
        }
        forces
    }

    /// Net axial force at every node of thin filament `index` (pN)
    pub fn thin_forces(&self, index: usize) -> Vec<f64> {
        let thin = &self.thin[index];
        let mut forces = thin.backbone_forces(self.z_line_nm);
        for site in thin.binding_sites() {
            if let Some(id) = site.bound_to {
                let xb = self.crossbridge(id);
                forces[site.node] -= self.head.axial_force(xb.state, self.head_separation(xb));
            }
        }
        forces
    }

    /// Net axial force at every node, flattened in filament order (pN)
    pub fn residual_forces(&self) -> Vec<f64> {
        (0..self.chain_count())
            .flat_map(|chain| self.chain_forces(chain))
            .collect()
    }

    fn chain_forces(&self, chain: usize) -> Vec<f64> {
        if chain < self.thick.len() {
            self.thick_forces(chain)
        } else {
            self.thin_forces(chain - self.thick.len())
        }
    }

    fn thick_system(&self, index: usize) -> ChainSystem {
        let thick = &self.thick[index];
        let step = self.params.settle.stiffness_step_nm;
        let mut diagonal = thick.backbone_diagonal();
        let tip = thick.tip();
        for face in &thick.faces {
            for xb in face.crossbridges.iter().filter(|xb| xb.is_bound()) {
                diagonal[xb.crown] +=
                    self.head
                        .axial_stiffness(xb.state, self.head_separation(xb), step);
            }
            diagonal[tip] += self.titin[face.titin].axial_stiffness(
                self.z_line_nm,
                thick.axial[tip],
                self.lattice_spacing_nm,
            );
        }
        ChainSystem {
            forces: self.thick_forces(index),
            diagonal,
            coupling: vec![thick.stiffness_pN_per_nm; thick.axial.len() - 1],
        }
    }

    fn thin_system(&self, index: usize) -> ChainSystem {
        let thin = &self.thin[index];
        let step = self.params.settle.stiffness_step_nm;
        let mut diagonal = thin.backbone_diagonal();
        for site in thin.binding_sites() {
            if let Some(id) = site.bound_to {
                let xb = self.crossbridge(id);
                diagonal[site.node] +=
                    self.head
                        .axial_stiffness(xb.state, self.head_separation(xb), step);
            }
        }
        ChainSystem {
            forces: self.thin_forces(index),
            diagonal,
            coupling: vec![thin.stiffness_pN_per_nm; thin.axial.len() - 1],
        }
    }
}

impl Relaxable for Lattice {
    fn chain_count(&self) -> usize {
        self.thick.len() + self.thin.len()
    }

    fn chain_system(&self, chain: usize) -> ChainSystem {
        if chain < self.thick.len() {
            self.thick_system(chain)
        } else {
            self.thin_system(chain - self.thick.len())
        }
    }

    fn displace_chain(&mut self, chain: usize, delta: &[f64]) {
        let n_thick = self.thick.len();
        let axial = if chain < n_thick {
            &mut self.thick[chain].axial
        } else {
            &mut self.thin[chain - n_thick].axial
        };
        for (x, d) in axial.iter_mut().zip(delta) {
            *x += d;
        }
    }

    fn max_residual(&self) -> f64 {
        let mut worst: f64 = 0.0;
        for chain in 0..self.chain_count() {
            for f in self.chain_forces(chain) {
                if !f.is_finite() {
                    return f64::NAN;
                }
                worst = worst.max(f.abs());
            }
        }
        worst
    }
}
