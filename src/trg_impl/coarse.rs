//! One Levin-Nave coarse-graining step.
//!
//! `A` is split along both diagonals into corner tensors, and four corners
//! meeting around a plaquette are contracted into the coarse tensor, which
//! then stands for twice as many lattice sites.

use super::{full_trace, AUX, DOWN, LEFT, RIGHT, UP};
use crate::error::TrgError;
use tensornet::{truncated_split, ContractionEngine, ContractionPlan, LabeledTensor, NetworkBuilder};
use tracing::debug;

/// Outcome of one coarse-graining step.
#[derive(Debug, Clone)]
pub struct CoarseGrained {
    /// Coarse tensor normalized to unit trace.
    pub tensor: LabeledTensor,
    /// Logarithm of the trace divided out of the coarse tensor.
    pub log_factor: f64,
    /// Larger of the two truncation errors of this step.
    pub truncation_error: f64,
}

/// Wiring of the four corner tensors around one plaquette.
///
/// External legs come out as `C0_aux, C1_aux, C2_aux, C3_aux`, which become
/// the up, right, down and left legs of the coarse tensor.
pub fn plaquette_plan() -> Result<ContractionPlan, TrgError> {
    let plan = NetworkBuilder::new()
        .tensor("C0", [AUX, RIGHT, DOWN])
        .tensor("C1", [AUX, DOWN, LEFT])
        .tensor("C2", [UP, LEFT, AUX])
        .tensor("C3", [UP, RIGHT, AUX])
        .contract("C0", RIGHT, "C1", LEFT)
        .contract("C1", DOWN, "C2", UP)
        .contract("C2", LEFT, "C3", RIGHT)
        .contract("C3", UP, "C0", DOWN)
        .build()?;
    Ok(plan)
}

/// Coarse-grain `a` (legs up, right, down, left), keeping at most `chi`
/// modes in each split.
pub fn coarse_grain(a: &LabeledTensor, chi: usize) -> Result<CoarseGrained, TrgError> {
    let (first, second) = rayon::join(
        || truncated_split(a, &[UP, RIGHT], &[DOWN, LEFT], chi, AUX),
        || truncated_split(a, &[UP, LEFT], &[RIGHT, DOWN], chi, AUX),
    );
    let first = first?;
    let second = second?;

    let (c3, c1) = (&first.left, &first.right);
    let (c2, c0) = (&second.left, &second.right);

    let plan = plaquette_plan()?;
    let tt = ContractionEngine
        .execute(&plan, &[("C0", c0), ("C1", c1), ("C2", c2), ("C3", c3)])?
        .relabel(&[UP, RIGHT, DOWN, LEFT])?;

    let factor = full_trace(&tt)?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(TrgError::DegenerateTrace(factor));
    }

    debug!(
        tensor = %tt,
        factor,
        chi_first = first.rank(),
        chi_second = second.rank(),
        "coarse-grained plaquette"
    );

    Ok(CoarseGrained {
        tensor: tt.scale(1.0 / factor),
        log_factor: factor.ln(),
        truncation_error: first.truncation_error.max(second.truncation_error),
    })
}
