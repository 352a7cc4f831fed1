//! Tensor renormalization group estimate of the 2D Ising free energy

pub mod app;
pub mod config;
pub mod error;
pub mod exact;
pub mod io;
pub mod model;
pub mod trg_impl;

pub use error::{RunAborted, TrgError};
pub use model::IsingModel;
pub use trg_impl::{Estimate, RgState, TrgRunner};
