//! Titin: exponential elastic link from the thick filament tip to the Z-line.
//!
//! L = sqrt((z - x_tip)² + ls²)
//! F = 0                         for L < L_rest
//! F = a · exp(b · (L - L_rest))  otherwise
//!
//! The molecule runs at angle θ = atan2(ls, z - x_tip) off the filament
//! axis, so it pulls the tip axially with F cos θ and radially with F sin θ.
//!
//! Reference: Linke WA et al. J Mol Biol, 1998

use serde::{Deserialize, Serialize};

use crate::config::TitinParameters;
use crate::lattice::{ThickFaceId, ThinFaceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Titin {
    /// Stable index, thick * 6 + face
    pub index: usize,
    /// Thick face whose tip this titin holds
    pub thick_face: ThickFaceId,
    /// Thin face it runs alongside to the Z-line
    pub thin_face: ThinFaceId,
    rest_length_nm: f64,
    a_pN: f64,
    b_per_nm: f64,
}

impl Titin {
    pub fn new(
        index: usize,
        thick_face: ThickFaceId,
        thin_face: ThinFaceId,
        params: &TitinParameters,
    ) -> Self {
        Self {
            index,
            thick_face,
            thin_face,
            rest_length_nm: params.rest_length_nm,
            a_pN: params.a_pN,
            b_per_nm: params.b_per_nm,
        }
    }

    /// End-to-end length (nm)
    pub fn length(&self, z_line_nm: f64, tip_nm: f64, lattice_spacing_nm: f64) -> f64 {
        (z_line_nm - tip_nm).hypot(lattice_spacing_nm)
    }

    /// Angle off the filament axis (rad)
    pub fn angle(&self, z_line_nm: f64, tip_nm: f64, lattice_spacing_nm: f64) -> f64 {
        lattice_spacing_nm.atan2(z_line_nm - tip_nm)
    }

    /// Tension along the molecule (pN)
    pub fn force(&self, z_line_nm: f64, tip_nm: f64, lattice_spacing_nm: f64) -> f64 {
        let length = self.length(z_line_nm, tip_nm, lattice_spacing_nm);
        self.force_at_length(length)
    }

    fn force_at_length(&self, length_nm: f64) -> f64 {
        if length_nm < self.rest_length_nm {
            0.0
        } else {
            self.a_pN * (self.b_per_nm * (length_nm - self.rest_length_nm)).exp()
        }
    }

    /// Axial pull on the thick tip, toward the Z-line (pN)
    pub fn axial_force(&self, z_line_nm: f64, tip_nm: f64, lattice_spacing_nm: f64) -> f64 {
        let force = self.force(z_line_nm, tip_nm, lattice_spacing_nm);
        force * self.angle(z_line_nm, tip_nm, lattice_spacing_nm).cos()
    }

    /// Radial pull toward the partner thin filament (pN)
    pub fn radial_force(&self, z_line_nm: f64, tip_nm: f64, lattice_spacing_nm: f64) -> f64 {
        let force = self.force(z_line_nm, tip_nm, lattice_spacing_nm);
        force * self.angle(z_line_nm, tip_nm, lattice_spacing_nm).sin()
    }

    /// Axial stiffness seen by the tip, -d(axial force)/d(x_tip) (pN/nm)
    ///
    /// With u = z - x_tip, the axial force is A(u) = F(L) u / L and
    /// dA/du = F'(L) u²/L² + F(L) ls²/L³.
    pub fn axial_stiffness(&self, z_line_nm: f64, tip_nm: f64, lattice_spacing_nm: f64) -> f64 {
        let u = z_line_nm - tip_nm;
        let length = u.hypot(lattice_spacing_nm);
        if length < self.rest_length_nm {
            return 0.0;
        }
        let force = self.force_at_length(length);
        let slope = self.b_per_nm * force;
        let ls2 = lattice_spacing_nm * lattice_spacing_nm;
        slope * u * u / (length * length) + force * ls2 / (length * length * length)
    }

    pub fn rest_length_nm(&self) -> f64 {
        self.rest_length_nm
    }
}
