//! Truncated singular value splitting of a tensor into two factors.

use crate::error::{Result, TensorError};
use crate::tensor::LabeledTensor;
use itertools::Itertools;
use tracing::debug;

/// Convergence tolerance handed to the SVD.
pub const SVD_EPSILON: f64 = f64::EPSILON;
/// Iteration cap for the SVD; exceeding it is reported as non-convergence.
pub const SVD_MAX_ITERATIONS: usize = 100_000;

/// Two factors whose contraction over `aux` approximates the input tensor.
#[derive(Debug, Clone)]
pub struct TruncatedSplit {
    /// Row legs followed by the auxiliary leg.
    pub left: LabeledTensor,
    /// The auxiliary leg followed by the column legs.
    pub right: LabeledTensor,
    /// Kept singular values, largest first.
    pub singular_values: Vec<f64>,
    /// Discarded share of the squared singular value sum, in `[0, 1]`.
    pub truncation_error: f64,
}

impl TruncatedSplit {
    pub fn rank(&self) -> usize {
        self.singular_values.len()
    }
}

/// Split `tensor` across the bipartition `rows | cols`, keeping at most `chi`
/// singular modes.
///
/// The weight of each kept mode is shared symmetrically:
/// `left = U sqrt(S)` and `right = sqrt(S) V^T`. When the matrix has fewer
/// than `chi` modes all of them are kept; nothing is padded.
pub fn truncated_split<S: AsRef<str>>(
    tensor: &LabeledTensor,
    rows: &[S],
    cols: &[S],
    chi: usize,
    aux: &str,
) -> Result<TruncatedSplit> {
    if chi == 0 {
        return Err(TensorError::InvalidTruncationRank(chi));
    }

    let matrix = tensor.to_matrix(rows, cols)?;
    let (nrows, ncols) = matrix.shape();
    if nrows == 0 || ncols == 0 {
        return Err(TensorError::EmptyMatrix {
            rows: nrows,
            cols: ncols,
        });
    }
    let row_shape = rows
        .iter()
        .map(|l| tensor.dim_of(l.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let col_shape = cols
        .iter()
        .map(|l| tensor.dim_of(l.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let non_convergence = TensorError::NonConvergence {
        rows: nrows,
        cols: ncols,
    };
    let svd = matrix
        .try_svd(true, true, SVD_EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| non_convergence.clone())?;
    let u = svd.u.ok_or_else(|| non_convergence.clone())?;
    let v_t = svd.v_t.ok_or(non_convergence)?;
    let s = svd.singular_values;

    let order = (0..s.len()).sorted_by(|&a, &b| s[b].total_cmp(&s[a])).collect_vec();
    let kept = &order[..chi.min(order.len())];
    let keep = kept.len();
    let sqrt_s = kept.iter().map(|&i| s[i].max(0.0).sqrt()).collect_vec();

    let total = s.iter().map(|x| x * x).sum::<f64>();
    let retained = kept.iter().map(|&i| s[i] * s[i]).sum::<f64>();
    let truncation_error = if total > 0.0 {
        ((total - retained) / total).max(0.0)
    } else {
        0.0
    };

    let mut left_data = Vec::with_capacity(nrows * keep);
    for r in 0..nrows {
        for (k, &mode) in kept.iter().enumerate() {
            left_data.push(u[(r, mode)] * sqrt_s[k]);
        }
    }
    let mut right_data = Vec::with_capacity(keep * ncols);
    for (k, &mode) in kept.iter().enumerate() {
        for c in 0..ncols {
            right_data.push(sqrt_s[k] * v_t[(mode, c)]);
        }
    }

    let left_legs = rows
        .iter()
        .map(|l| l.as_ref().to_string())
        .chain([aux.to_string()]);
    let right_legs = [aux.to_string()]
        .into_iter()
        .chain(cols.iter().map(|l| l.as_ref().to_string()));
    let left_shape = row_shape.into_iter().chain([keep]).collect();
    let right_shape = [keep].into_iter().chain(col_shape).collect();

    debug!(
        rows = nrows,
        cols = ncols,
        kept = keep,
        truncation_error,
        "truncated split"
    );

    Ok(TruncatedSplit {
        left: LabeledTensor::new(left_legs, left_shape, left_data)?,
        right: LabeledTensor::new(right_legs, right_shape, right_data)?,
        singular_values: kept.iter().map(|&i| s[i]).collect(),
        truncation_error,
    })
}
