//! Named-leg dense tensors and the machinery to wire them into networks.
//!
//! - [`LabeledTensor`]: a dense real array whose axes carry leg names.
//! - [`NetworkBuilder`] / [`ContractionPlan`]: a symbolic description of which
//!   legs of which tensors are summed together.
//! - [`ContractionEngine`]: evaluates a plan against concrete tensors.
//! - [`truncated_split`]: rank-truncated SVD splitting of a tensor into two
//!   factors joined by a new auxiliary leg.
//!
//! ```rust,ignore
//! use tensornet::{ContractionEngine, NetworkBuilder};
//!
//! let plan = NetworkBuilder::new()
//!     .tensor("A", ["i", "k"])
//!     .tensor("B", ["k", "j"])
//!     .contract("A", "k", "B", "k")
//!     .build()?;
//! let c = ContractionEngine.execute(&plan, &[("A", &a), ("B", &b)])?;
//! assert_eq!(c.legs(), &["A_i", "B_j"]);
//! ```

pub mod engine;
pub mod error;
pub mod factorize;
pub mod network;
pub mod tensor;

pub use engine::ContractionEngine;
pub use error::{ErrorKind, Result, TensorError};
pub use factorize::{truncated_split, TruncatedSplit};
pub use network::{ContractionPlan, NetworkBuilder};
pub use tensor::LabeledTensor;
