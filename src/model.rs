use crate::error::TrgError;
use crate::exact;

/// Nearest-neighbour Ising model on the square lattice in zero field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsingModel {
    /// Temperature in units of J/k_B when both constants are 1
    pub temperature: f64,
    /// Coupling constant J
    pub coupling: f64,
    /// Boltzmann constant k_B
    pub boltzmann: f64,
}

impl IsingModel {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            coupling: 1.0,
            boltzmann: 1.0,
        }
    }

    /// The model at its critical temperature.
    pub fn critical() -> Self {
        Self::new(exact::critical_temperature(1.0, 1.0))
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn with_boltzmann(mut self, boltzmann: f64) -> Self {
        self.boltzmann = boltzmann;
        self
    }

    /// Dimensionless coupling K = J / (k_B T).
    pub fn reduced_coupling(&self) -> f64 {
        self.coupling / (self.boltzmann * self.temperature)
    }

    /// k_B T
    pub fn thermal_energy(&self) -> f64 {
        self.boltzmann * self.temperature
    }

    pub fn validate(&self) -> Result<(), TrgError> {
        let checks = [
            ("temperature", self.temperature),
            ("coupling", self.coupling),
            ("boltzmann constant", self.boltzmann),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrgError::InvalidConfig(format!(
                    "{name} must be a finite positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
