//! Tensor renormalization group (Levin-Nave) for the square-lattice Ising model
//!
//! The partition function is written as a network of identical rank-4 site
//! tensors with legs up, right, down and left. Every step splits the tensor
//! along both diagonals with a truncated SVD and recombines four corners
//! into a coarse tensor standing for twice as many sites, rotated by 45°.
//!
//! # Free energy
//!
//! After each step the coarse tensor is divided by its trace. With
//! `log_factors[i]` extracted from a tensor standing for `n_spins[i] = 2^i`
//! sites:
//!
//! f ≈ -k_B T Σ_i log_factors[i] / n_spins[i]
//!
//! # Usage
//!
//! ```ignore
//! let model = IsingModel::critical();
//! let mut runner = TrgRunner::with_exact_reference(model)?;
//! let estimates = runner.run(20, 16)?;
//! println!("{:.12e}", estimates.last().unwrap().relative_error);
//! ```

mod coarse;
mod initial;
mod runner;
#[cfg(test)]
mod tests;

pub use coarse::{coarse_grain, plaquette_plan, CoarseGrained};
pub use initial::{initial_tensor, site_tensor};
pub use runner::{Estimate, RgState, TrgRunner, MAX_STEPS};

use crate::error::TrgError;
use tensornet::LabeledTensor;

pub const UP: &str = "u";
pub const RIGHT: &str = "r";
pub const DOWN: &str = "d";
pub const LEFT: &str = "l";
/// Leg created by a truncated split.
pub const AUX: &str = "aux";

/// Σ_{u,r} T[u,r,u,r]
///
/// Contracts up with down first, then right with left.
pub fn full_trace(tensor: &LabeledTensor) -> Result<f64, TrgError> {
    let value = tensor.trace(UP, DOWN)?.trace(RIGHT, LEFT)?.item()?;
    Ok(value)
}
