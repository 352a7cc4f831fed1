use crate::config::Config;
use crate::error::TrgError;
use crate::io::write_estimates;
use crate::trg_impl::{Estimate, TrgRunner};
use color_eyre::eyre::Result;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of one run of the sweep
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub chi: usize,
    /// Estimates in step order, possibly cut short by `failure`.
    pub estimates: Vec<Estimate>,
    pub elapsed: Duration,
    pub failure: Option<TrgError>,
}

impl SweepRun {
    pub fn is_aborted(&self) -> bool {
        self.failure.is_some()
    }

    pub fn final_estimate(&self) -> Option<&Estimate> {
        self.estimates.last()
    }
}

/// Run one independent renormalization group per truncation rank, writing
/// every estimate row to `table`.
///
/// A failing run is logged and the sweep moves on to the next rank.
pub fn run_sweep<W: Write>(config: &Config, table: &mut W) -> Result<Vec<SweepRun>> {
    config.validate()?;
    let model = config.model();
    let steps = config.num_steps();

    let mut runs = Vec::new();
    for chi in config.truncation_ranks() {
        info!(
            "temperature = {}, steps = {}, chi = {}",
            model.temperature, steps, chi
        );
        let start = Instant::now();
        let mut runner = TrgRunner::with_exact_reference(model)?;
        let (estimates, failure) = match runner.run(steps, chi) {
            Ok(estimates) => (estimates, None),
            Err(aborted) => {
                warn!("{}", aborted);
                (aborted.estimates, Some(aborted.source))
            }
        };
        write_estimates(table, &estimates)?;
        let elapsed = start.elapsed();
        info!("elapsed time: {:.3} s", elapsed.as_secs_f64());

        runs.push(SweepRun {
            chi,
            estimates,
            elapsed,
            failure,
        });
    }
    Ok(runs)
}
