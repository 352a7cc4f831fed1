use super::runner::SweepRun;
use crate::model::IsingModel;
use tracing::info;

pub fn report_model(model: &IsingModel, reference: f64) {
    info!("\nIsing model on the square lattice:");
    info!("  Temperature: {}", model.temperature);
    info!("  Coupling J: {}", model.coupling);
    info!("  Boltzmann constant: {}", model.boltzmann);
    info!("  Exact free energy per site: {:.12e}", reference);
}

pub fn report_sweep_summary(runs: &[SweepRun]) {
    info!("\nTRG sweep finished.");
    info!("  {:>5} {:>6} {:>20} {:>20} {:>10}", "chi", "step", "free energy", "relative error", "time (s)");
    for run in runs {
        match (run.final_estimate(), &run.failure) {
            (Some(estimate), None) => info!(
                "  {:>5} {:>6} {:>20.12e} {:>20.12e} {:>10.3}",
                run.chi,
                estimate.step,
                estimate.free_energy,
                estimate.relative_error,
                run.elapsed.as_secs_f64()
            ),
            (_, Some(failure)) => info!("  {:>5} aborted: {}", run.chi, failure),
            (None, None) => info!("  {:>5} no estimates", run.chi),
        }
    }
}
