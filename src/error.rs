use crate::trg_impl::Estimate;
use tensornet::{ErrorKind, TensorError};
use thiserror::Error;

/// Failure kinds of a renormalization group run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrgError {
    /// Rejected parameters; nothing was computed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The singular value decomposition of a step did not converge.
    #[error("numerical non-convergence: {0}")]
    NonConvergence(#[source] TensorError),

    /// The tensor network was wired inconsistently.
    #[error("contraction plan violation: {0}")]
    PlanViolation(#[source] TensorError),

    /// A normalization trace was zero, negative or not finite.
    #[error("tensor trace {0} cannot be used as a normalization factor")]
    DegenerateTrace(f64),
}

impl From<TensorError> for TrgError {
    fn from(err: TensorError) -> Self {
        if let TensorError::InvalidTruncationRank(chi) = err {
            return TrgError::InvalidConfig(format!("truncation rank must be at least 1, got {chi}"));
        }
        match err.kind() {
            ErrorKind::NonConvergence => TrgError::NonConvergence(err),
            ErrorKind::PlanViolation | ErrorKind::Usage => TrgError::PlanViolation(err),
        }
    }
}

/// A run that stopped early, with everything computed before the failure.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("run aborted at step {step}: {source}")]
pub struct RunAborted {
    /// Index of the step that failed, i.e. the number of completed steps.
    pub step: usize,
    /// Estimates recorded before the failure.
    pub estimates: Vec<Estimate>,
    #[source]
    pub source: TrgError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_errors_are_routed_by_kind() {
        let svd = TensorError::NonConvergence { rows: 4, cols: 4 };
        assert!(matches!(TrgError::from(svd), TrgError::NonConvergence(_)));

        let plan = TensorError::UnknownTensor("C5".to_string());
        assert!(matches!(TrgError::from(plan), TrgError::PlanViolation(_)));
    }

    #[test]
    fn test_abort_message_names_the_step() {
        let abort = RunAborted {
            step: 3,
            estimates: Vec::new(),
            source: TrgError::DegenerateTrace(f64::INFINITY),
        };
        assert_eq!(
            abort.to_string(),
            "run aborted at step 3: tensor trace inf cannot be used as a normalization factor"
        );
    }
}
