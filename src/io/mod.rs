//! Input/Output operations for TRG runs
//!
//! This module handles logging setup and the estimate table.

mod output;

pub use output::{setup_output, write_estimates};
