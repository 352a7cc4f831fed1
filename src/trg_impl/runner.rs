use super::coarse::coarse_grain;
use super::initial::initial_tensor;
use crate::error::{RunAborted, TrgError};
use crate::exact;
use crate::model::IsingModel;
use tensornet::LabeledTensor;
use tracing::{debug, info};

/// Largest step count whose per-copy site count `2^step` fits in a `u64`.
pub const MAX_STEPS: usize = 63;

/// Free-energy estimate after a given number of coarse-graining steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub step: usize,
    /// Lattice sites represented by one copy of the current tensor.
    pub sites_per_copy: u64,
    pub free_energy: f64,
    /// (f - f_exact) / |f_exact|
    pub relative_error: f64,
}

/// Evolving tensor together with the normalization factors divided out of it.
///
/// `log_factors[i]` was extracted from a tensor standing for `n_spins[i]`
/// sites, so `ln Z / N = Σ log_factors[i] / n_spins[i]` in the
/// thermodynamic limit.
#[derive(Debug, Clone)]
pub struct RgState {
    tensor: LabeledTensor,
    log_factors: Vec<f64>,
    n_spins: Vec<u64>,
    step: usize,
}

impl RgState {
    pub fn new(model: &IsingModel) -> Result<Self, TrgError> {
        model.validate()?;
        let (tensor, log_factor) = initial_tensor(model)?;
        Ok(Self {
            tensor,
            log_factors: vec![log_factor],
            n_spins: vec![1],
            step: 0,
        })
    }

    pub fn tensor(&self) -> &LabeledTensor {
        &self.tensor
    }

    pub fn log_factors(&self) -> &[f64] {
        &self.log_factors
    }

    pub fn n_spins(&self) -> &[u64] {
        &self.n_spins
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn sites_per_copy(&self) -> u64 {
        self.n_spins.last().copied().unwrap_or(1)
    }

    /// Apply one coarse-graining step. On failure the state is left untouched.
    pub fn advance(&mut self, chi: usize) -> Result<f64, TrgError> {
        let sites = self.sites_per_copy().checked_mul(2).ok_or_else(|| {
            TrgError::InvalidConfig(format!("more than {MAX_STEPS} steps overflow the site count"))
        })?;
        let coarse = coarse_grain(&self.tensor, chi)?;
        debug!(
            step = self.step + 1,
            log_factor = coarse.log_factor,
            truncation_error = coarse.truncation_error,
            "renormalization step"
        );

        self.tensor = coarse.tensor;
        self.log_factors.push(coarse.log_factor);
        self.n_spins.push(sites);
        self.step += 1;
        Ok(coarse.truncation_error)
    }

    /// f = -k_B T Σ log_factors[i] / n_spins[i]
    pub fn free_energy(&self, model: &IsingModel) -> f64 {
        let log_z_per_site = self
            .log_factors
            .iter()
            .zip(&self.n_spins)
            .map(|(log_factor, &n)| log_factor / n as f64)
            .sum::<f64>();
        -model.thermal_energy() * log_z_per_site
    }
}

/// Drives coarse-graining steps for one model and reports the estimates.
#[derive(Debug, Clone)]
pub struct TrgRunner {
    model: IsingModel,
    reference: f64,
    state: RgState,
}

impl TrgRunner {
    /// Start from the initial site tensor. `reference` is the exact free
    /// energy the estimates are compared against.
    pub fn new(model: IsingModel, reference: f64) -> Result<Self, TrgError> {
        let state = RgState::new(&model)?;
        Ok(Self {
            model,
            reference,
            state,
        })
    }

    /// Use Onsager's solution as the reference.
    pub fn with_exact_reference(model: IsingModel) -> Result<Self, TrgError> {
        model.validate()?;
        let reference = exact::free_energy_per_site(model.temperature, model.coupling, model.boltzmann);
        Self::new(model, reference)
    }

    pub fn model(&self) -> &IsingModel {
        &self.model
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    pub fn state(&self) -> &RgState {
        &self.state
    }

    /// Estimate from the current state.
    pub fn estimate(&self) -> Estimate {
        let free_energy = self.state.free_energy(&self.model);
        Estimate {
            step: self.state.step(),
            sites_per_copy: self.state.sites_per_copy(),
            free_energy,
            relative_error: (free_energy - self.reference) / self.reference.abs(),
        }
    }

    /// Perform `steps` coarse-graining steps with truncation rank `chi`.
    ///
    /// Returns one estimate for the current state and one per completed
    /// step. If a step fails, the estimates gathered so far are returned in
    /// the error and the state stays at the last successful step.
    pub fn run(&mut self, steps: usize, chi: usize) -> Result<Vec<Estimate>, RunAborted> {
        let abort = |step, estimates, source| RunAborted {
            step,
            estimates,
            source,
        };

        if chi == 0 {
            return Err(abort(
                self.state.step(),
                Vec::new(),
                TrgError::InvalidConfig("truncation rank must be at least 1".to_string()),
            ));
        }
        if steps > MAX_STEPS.saturating_sub(self.state.step()) {
            return Err(abort(
                self.state.step(),
                Vec::new(),
                TrgError::InvalidConfig(format!(
                    "{} steps requested after {} completed, at most {MAX_STEPS} in total",
                    steps,
                    self.state.step()
                )),
            ));
        }

        let mut estimates = Vec::with_capacity(steps + 1);
        estimates.push(self.record());
        for _ in 0..steps {
            if let Err(err) = self.state.advance(chi) {
                return Err(abort(self.state.step(), estimates, err));
            }
            estimates.push(self.record());
        }
        Ok(estimates)
    }

    fn record(&self) -> Estimate {
        let estimate = self.estimate();
        info!(
            "{:04} {:6} {:.12e} {:.12e}",
            estimate.step, estimate.sites_per_copy, estimate.free_energy, estimate.relative_error
        );
        estimate
    }
}
