//! Independent replicate runs on the rayon pool.
//!
//! Each worker owns its own lattice and RNG; nothing is shared between
//! workers, so results depend only on the base seed and worker index.

use rayon::prelude::*;

use crate::config::{LatticeConfig, Parameters};
use crate::error::SimulationError;
use crate::lattice::Lattice;
use crate::state::TimestepMetrics;

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for replicate `worker` of an ensemble seeded with `base`
pub fn derive_worker_seed(base: u64, worker: usize) -> u64 {
    base.wrapping_add((worker as u64).wrapping_mul(SEED_STRIDE))
}

/// Run `workers` independent lattices for `steps` timesteps each
///
/// Returns the per-timestep metrics of every worker, in worker order.
pub fn run_ensemble(
    config: &LatticeConfig,
    params: &Parameters,
    base_seed: u64,
    workers: usize,
    steps: usize,
) -> Result<Vec<Vec<TimestepMetrics>>, SimulationError> {
    log::info!(
        "Running ensemble of {} workers x {} timesteps (base seed {})",
        workers,
        steps,
        base_seed
    );
    (0..workers)
        .into_par_iter()
        .map(|worker| {
            let config = LatticeConfig {
                seed: Some(derive_worker_seed(base_seed, worker)),
                ..config.clone()
            };
            let mut lattice = Lattice::new(config, params.clone())?;
            lattice.run(steps, |_, metrics| metrics.clone())
        })
        .collect()
}
