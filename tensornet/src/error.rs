//! Error types shared by tensors, contraction plans and factorizations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TensorError>;

/// Broad classification of a [`TensorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A tensor was constructed or addressed inconsistently.
    Usage,
    /// A network description or its inputs do not fit together.
    PlanViolation,
    /// A numerical routine failed to converge.
    NonConvergence,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    #[error("{legs} leg names given for a tensor of rank {rank}")]
    LegCountMismatch { legs: usize, rank: usize },

    #[error("leg `{0}` appears more than once")]
    DuplicateLeg(String),

    #[error("data holds {found} elements but the shape requires {expected}")]
    DataLengthMismatch { expected: usize, found: usize },

    #[error("tensor has no leg named `{0}`")]
    MissingLeg(String),

    #[error("legs `{left}` ({left_dim}) and `{right}` ({right_dim}) have different lengths")]
    DimensionMismatch {
        left: String,
        right: String,
        left_dim: usize,
        right_dim: usize,
    },

    #[error("expected a rank-0 tensor, found rank {0}")]
    NotAScalar(usize),

    #[error("cannot factorize a tensor with an empty matrix view ({rows}x{cols})")]
    EmptyMatrix { rows: usize, cols: usize },

    #[error("network declares no tensors")]
    EmptyNetwork,

    #[error("tensor `{0}` is declared twice")]
    DuplicateTensor(String),

    #[error("network has no tensor named `{0}`")]
    UnknownTensor(String),

    #[error("tensor `{tensor}` has no leg named `{leg}`")]
    UnknownLeg { tensor: String, leg: String },

    #[error("leg `{leg}` of tensor `{tensor}` is contracted more than once")]
    LegContractedTwice { tensor: String, leg: String },

    #[error("data supplied more than once for tensor `{0}`")]
    DuplicateInput(String),

    #[error("no data supplied for tensor `{0}`")]
    MissingTensor(String),

    #[error("tensor `{tensor}` was declared with legs {expected:?} but supplied with {found:?}")]
    LegSetMismatch {
        tensor: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("truncation rank must be at least 1, got {0}")]
    InvalidTruncationRank(usize),

    #[error("singular value decomposition of a {rows}x{cols} matrix did not converge")]
    NonConvergence { rows: usize, cols: usize },
}

impl TensorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TensorError::NonConvergence { .. } => ErrorKind::NonConvergence,
            TensorError::EmptyNetwork
            | TensorError::DuplicateTensor(_)
            | TensorError::UnknownTensor(_)
            | TensorError::UnknownLeg { .. }
            | TensorError::LegContractedTwice { .. }
            | TensorError::MissingTensor(_)
            | TensorError::DuplicateInput(_)
            | TensorError::LegSetMismatch { .. }
            | TensorError::DimensionMismatch { .. } => ErrorKind::PlanViolation,
            _ => ErrorKind::Usage,
        }
    }
}
