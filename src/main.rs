//! TRG Command-Line Interface
//!
//! Estimates the free energy per site of the 2D Ising model for each
//! configured truncation rank and compares it with Onsager's solution.

use color_eyre::eyre::Result;
use ising_trg::app::TrgApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    TrgApplication::from_cli()?.run()
}
