//! Fixed filament arrangement of the half-sarcomere unit cell.
//!
//! Four thick filaments sit in a hexagonal lattice, each surrounded by six
//! thin filaments; the eight thin filaments of the unit cell each face
//! three thick filaments. Periodic boundaries wrap the cell so every thick
//! face pairs with exactly one thin face and vice versa.
//!
//! ```text
//!        a1      a3
//!    a0      a2      a0
//!        M0      M1
//!    a4      a6      a4
//!        a5      a7      a5
//!            M2      M3
//!        a1      a3      a1
//!            a2      a0
//! ```
//!
//! Thick faces are numbered 0-5 counter-clockwise at 60° steps; thin faces
//! 0-2 at 120° steps.

use glam::DVec2;

use super::address::{ThickFaceId, ThinFaceId};

pub const THICK_COUNT: usize = 4;
pub const THIN_COUNT: usize = 8;
pub const THICK_FACE_COUNT: usize = 6;
pub const THIN_FACE_COUNT: usize = 3;
pub const TITIN_COUNT: usize = THICK_COUNT * THICK_FACE_COUNT;

/// (thin, thin face) facing each thick face
const THICK_TO_THIN: [[(usize, usize); THICK_FACE_COUNT]; THICK_COUNT] = [
    [(0, 1), (1, 2), (2, 2), (6, 0), (5, 0), (4, 1)],
    [(2, 1), (3, 2), (0, 2), (4, 0), (7, 0), (6, 1)],
    [(5, 1), (6, 2), (7, 2), (3, 0), (2, 0), (1, 1)],
    [(7, 1), (4, 2), (5, 2), (1, 0), (0, 0), (3, 1)],
];

/// (thick, thick face) facing each thin face
const THIN_TO_THICK: [[(usize, usize); THIN_FACE_COUNT]; THIN_COUNT] = [
    [(3, 4), (0, 0), (1, 2)],
    [(3, 3), (2, 5), (0, 1)],
    [(2, 4), (1, 0), (0, 2)],
    [(2, 3), (3, 5), (1, 1)],
    [(1, 3), (0, 5), (3, 1)],
    [(0, 4), (2, 0), (3, 2)],
    [(0, 3), (1, 5), (2, 1)],
    [(1, 4), (3, 0), (2, 2)],
];

/// Thin face opposite a thick face
pub fn thin_partner(face: ThickFaceId) -> ThinFaceId {
    let (thin, thin_face) = THICK_TO_THIN[face.thick][face.face];
    ThinFaceId {
        thin,
        face: thin_face,
    }
}

/// Thick face opposite a thin face
pub fn thick_partner(face: ThinFaceId) -> ThickFaceId {
    let (thick, thick_face) = THIN_TO_THICK[face.thin][face.face];
    ThickFaceId {
        thick,
        face: thick_face,
    }
}

/// Unit (y, z) direction from a thick filament toward the thin filament
/// on `face`
pub fn thick_face_direction(face: usize) -> DVec2 {
    let angle = (face as f64) * std::f64::consts::FRAC_PI_3;
    DVec2::new(angle.cos(), angle.sin())
}

/// Faces served by crown `crown`; consecutive crowns alternate triplets
pub fn crown_faces(crown: usize) -> [usize; 3] {
    if crown % 2 == 0 {
        [0, 2, 4]
    } else {
        [1, 3, 5]
    }
}

/// Crown carrying the `index`-th cross-bridge of thick face `face`
pub fn crown_of(face: usize, index: usize) -> usize {
    2 * index + face % 2
}

/// Thin face owning the binding site at node `node`
pub fn node_face(node: usize) -> usize {
    node % THIN_FACE_COUNT
}
