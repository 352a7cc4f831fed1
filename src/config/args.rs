//! Command-line argument parsing for TRG runs

use clap::Parser;

/// Free energy of the 2D Ising model by tensor renormalization group
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Override temperature (default: critical temperature)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Override coupling constant J
    #[arg(long)]
    pub coupling: Option<f64>,

    /// Override Boltzmann constant k_B
    #[arg(long)]
    pub boltzmann: Option<f64>,

    /// Truncation rank to sweep; repeat for several runs
    #[arg(long)]
    pub chi: Vec<usize>,

    /// Override number of coarse-graining steps
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the estimate table to this file instead of stdout
    #[arg(long)]
    pub table: Option<String>,
}
