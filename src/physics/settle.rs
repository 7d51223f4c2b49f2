//! Force-balance relaxation.
//!
//! The lattice is a set of one-dimensional spring chains (filaments)
//! coupled to each other through bound cross-bridges. Each chain's
//! Jacobian is tridiagonal: backbone springs couple neighbouring nodes,
//! and cross-bridge and titin stiffness add to the diagonal. Settling runs
//! block Gauss-Seidel sweeps: every chain in turn takes a Newton step with
//! the other chains held fixed, solved exactly by the Thomas algorithm.
//! Sweeps repeat until the largest nodal force drops below tolerance.
//!
//! An already balanced system is left untouched.

use crate::config::SettleParameters;
use crate::error::SettleError;

/// Linearized force balance of one chain around its current positions
#[derive(Debug, Clone, Default)]
pub struct ChainSystem {
    /// Net force at each node (pN)
    pub forces: Vec<f64>,
    /// Stiffness at each node, -dF_i/dx_i (pN/nm)
    pub diagonal: Vec<f64>,
    /// Backbone stiffness between node i and i+1 (pN/nm)
    pub coupling: Vec<f64>,
}

/// Something made of chains that can be relaxed toward force balance
pub trait Relaxable {
    /// Number of independently solvable chains
    fn chain_count(&self) -> usize;

    /// Linearize chain `chain` around the current state
    fn chain_system(&self, chain: usize) -> ChainSystem;

    /// Shift the nodes of chain `chain` by `delta`
    fn displace_chain(&mut self, chain: usize, delta: &[f64]);

    /// Largest absolute nodal force over every chain (pN), NaN if any
    /// force is not finite
    fn max_residual(&self) -> f64;
}

/// Outcome of a successful settle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleReport {
    /// Sweeps taken; zero when the system was already balanced
    pub sweeps: usize,
    /// Largest nodal force after settling (pN)
    pub residual_pN: f64,
}

/// Relax `system` until its largest nodal force is below tolerance
pub fn settle<S: Relaxable + ?Sized>(
    system: &mut S,
    params: &SettleParameters,
) -> Result<SettleReport, SettleError> {
    let mut residual = system.max_residual();
    let mut sweeps = 0;

    while !(residual < params.tolerance_pN) {
        if !residual.is_finite() {
            return Err(SettleError::Diverged { iteration: sweeps });
        }
        if sweeps >= params.max_sweeps {
            return Err(SettleError::MaxIterations {
                iterations: sweeps,
                residual_pN: residual,
            });
        }

        for chain in 0..system.chain_count() {
            let linear = system.chain_system(chain);
            let delta = newton_step(&linear).ok_or(SettleError::Diverged { iteration: sweeps })?;
            system.displace_chain(chain, &delta);
        }

        sweeps += 1;
        residual = system.max_residual();
        log::trace!("settle sweep {}: residual {:.6} pN", sweeps, residual);
    }

    Ok(SettleReport {
        sweeps,
        residual_pN: residual,
    })
}

/// Solve K δ = F for one chain, K = tridiag(-coupling, diagonal, -coupling)
pub fn newton_step(system: &ChainSystem) -> Option<Vec<f64>> {
    let off: Vec<f64> = system.coupling.iter().map(|k| -k).collect();
    solve_tridiagonal(&off, &system.diagonal, &off, &system.forces)
}

/// Thomas algorithm for a tridiagonal system
///
/// `lower[i]` couples row i+1 to column i, `upper[i]` couples row i to
/// column i+1. Returns `None` on a zero pivot or a non-finite result.
pub fn solve_tridiagonal(lower: &[f64], diagonal: &[f64], upper: &[f64], rhs: &[f64]) -> Option<Vec<f64>> {
    let n = diagonal.len();
    if n == 0 || rhs.len() != n || lower.len() + 1 != n || upper.len() + 1 != n {
        return None;
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    let mut pivot = diagonal[0];
    if pivot == 0.0 {
        return None;
    }
    if n > 1 {
        c_prime[0] = upper[0] / pivot;
    }
    d_prime[0] = rhs[0] / pivot;

    for i in 1..n {
        pivot = diagonal[i] - lower[i - 1] * c_prime[i - 1];
        if pivot == 0.0 {
            return None;
        }
        if i < n - 1 {
            c_prime[i] = upper[i] / pivot;
        }
        d_prime[i] = (rhs[i] - lower[i - 1] * d_prime[i - 1]) / pivot;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}
