//! Configuration management for TRG runs
//!
//! This module handles configuration structures, defaults, and validation.
//! Values are resolved as command line, then configuration file, then
//! defaults.

mod args;

pub use args::Args;

use crate::error::TrgError;
use crate::exact::critical_temperature;
use crate::model::IsingModel;
use crate::trg_impl::MAX_STEPS;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: ModelParams,
    #[serde(default)]
    pub trg: TrgParams,
}

/// Physical parameters of the Ising model
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ModelParams {
    pub temperature: Option<f64>,
    pub coupling: Option<f64>,
    pub boltzmann: Option<f64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            // Resolved from J and k_B in `with_defaults`.
            temperature: None,
            coupling: Some(1.0),
            boltzmann: Some(1.0),
        }
    }
}

impl ModelParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.coupling.is_none() {
            self.coupling = defaults.coupling;
        }
        if self.boltzmann.is_none() {
            self.boltzmann = defaults.boltzmann;
        }
        if self.temperature.is_none() {
            self.temperature = Some(critical_temperature(
                self.coupling.unwrap_or(1.0),
                self.boltzmann.unwrap_or(1.0),
            ));
        }
        self
    }
}

/// Renormalization group parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrgParams {
    pub truncation_ranks: Option<Vec<usize>>,
    pub num_steps: Option<usize>,
}

impl Default for TrgParams {
    fn default() -> Self {
        TrgParams {
            truncation_ranks: Some(vec![4, 8, 16, 40]),
            num_steps: Some(20),
        }
    }
}

impl TrgParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.truncation_ranks.is_none() {
            self.truncation_ranks = defaults.truncation_ranks;
        }
        if self.num_steps.is_none() {
            self.num_steps = defaults.num_steps;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.model = self.model.with_defaults();
        self.trg = self.trg.with_defaults();
        self
    }

    /// Replace file values by the ones given on the command line
    pub fn apply_args(mut self, args: &Args) -> Self {
        if args.temperature.is_some() {
            self.model.temperature = args.temperature;
        }
        if args.coupling.is_some() {
            self.model.coupling = args.coupling;
        }
        if args.boltzmann.is_some() {
            self.model.boltzmann = args.boltzmann;
        }
        if !args.chi.is_empty() {
            self.trg.truncation_ranks = Some(args.chi.clone());
        }
        if args.steps.is_some() {
            self.trg.num_steps = args.steps;
        }
        self
    }

    /// The model described by this configuration
    pub fn model(&self) -> IsingModel {
        let coupling = self.model.coupling.unwrap_or(1.0);
        let boltzmann = self.model.boltzmann.unwrap_or(1.0);
        let temperature = self
            .model
            .temperature
            .unwrap_or_else(|| critical_temperature(coupling, boltzmann));
        IsingModel::new(temperature)
            .with_coupling(coupling)
            .with_boltzmann(boltzmann)
    }

    /// Get the truncation ranks to sweep
    pub fn truncation_ranks(&self) -> Vec<usize> {
        self.trg
            .truncation_ranks
            .clone()
            .unwrap_or_else(|| vec![4, 8, 16, 40])
    }

    /// Get the number of coarse-graining steps per run
    pub fn num_steps(&self) -> usize {
        self.trg.num_steps.unwrap_or(20)
    }

    /// Reject values a run cannot use. Nothing is clamped.
    pub fn validate(&self) -> Result<(), TrgError> {
        self.model().validate()?;

        let ranks = self.truncation_ranks();
        if ranks.is_empty() {
            return Err(TrgError::InvalidConfig(
                "at least one truncation rank is required".to_string(),
            ));
        }
        if ranks.contains(&0) {
            return Err(TrgError::InvalidConfig(
                "truncation ranks must be at least 1".to_string(),
            ));
        }

        let steps = self.num_steps();
        if steps > MAX_STEPS {
            return Err(TrgError::InvalidConfig(format!(
                "num_steps must not exceed {MAX_STEPS}, got {steps}"
            )));
        }
        Ok(())
    }
}
