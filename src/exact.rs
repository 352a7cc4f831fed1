//! Onsager's exact free energy of the square-lattice Ising model.
//!
//! Used only as a reference to measure the accuracy of renormalization
//! group estimates.

use std::f64::consts::PI;

/// Absolute tolerance for each half of the integral.
const QUADRATURE_TOLERANCE: f64 = 1e-12;
const QUADRATURE_MAX_DEPTH: u32 = 50;

/// T_c = 2J / (k_B ln(1 + √2)) ≈ 2.269 J/k_B
pub fn critical_temperature(coupling: f64, boltzmann: f64) -> f64 {
    2.0 * coupling / (boltzmann * (1.0 + 2.0_f64.sqrt()).ln())
}

/// kappa = 2 sinh(2K) / cosh²(2K)
pub fn kappa(reduced_coupling: f64) -> f64 {
    let two_k = 2.0 * reduced_coupling;
    2.0 * two_k.sinh() / two_k.cosh().powi(2)
}

fn integrand(theta: f64, kappa: f64) -> f64 {
    let s = theta.sin();
    // Rounding can push the radicand slightly below zero at kappa = 1.
    let radicand = (1.0 - kappa * kappa * s * s).max(0.0);
    (0.5 * (1.0 + radicand.sqrt())).ln()
}

/// Free energy per site f(T).
///
/// -βf = ln(2 cosh 2K) + 1/(2π) ∫₀^π ln[½(1 + √(1 - κ² sin²θ))] dθ
pub fn free_energy_per_site(temperature: f64, coupling: f64, boltzmann: f64) -> f64 {
    let beta = 1.0 / (boltzmann * temperature);
    let k = beta * coupling;
    let kap = kappa(k);
    let f = |theta: f64| integrand(theta, kap);

    // The integrand has a kink at π/2 when κ = 1, so integrate the halves separately.
    let integral = adaptive_simpson(&f, 0.0, PI / 2.0, QUADRATURE_TOLERANCE)
        + adaptive_simpson(&f, PI / 2.0, PI, QUADRATURE_TOLERANCE);

    let minus_beta_f = (2.0 * (2.0 * k).cosh()).ln() + integral / (2.0 * PI);
    -minus_beta_f / beta
}

fn adaptive_simpson<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, tolerance: f64) -> f64 {
    let fa = f(a);
    let fb = f(b);
    let m = 0.5 * (a + b);
    let fm = f(m);
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    simpson_step(f, a, b, tolerance, whole, fa, fm, fb, QUADRATURE_MAX_DEPTH)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    tolerance: f64,
    whole: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    depth: u32,
) -> f64 {
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;

    if depth == 0 || delta.abs() <= 15.0 * tolerance {
        return left + right + delta / 15.0;
    }
    simpson_step(f, a, m, tolerance / 2.0, left, fa, flm, fm, depth - 1)
        + simpson_step(f, m, b, tolerance / 2.0, right, fm, frm, fb, depth - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_critical_temperature() {
        assert_relative_eq!(critical_temperature(1.0, 1.0), 2.269185314213022, epsilon = 1e-12);
        assert_relative_eq!(critical_temperature(2.0, 1.0), 2.0 * 2.269185314213022, epsilon = 1e-12);
    }

    #[test]
    fn test_kappa_is_one_at_criticality() {
        let k_c = 1.0 / critical_temperature(1.0, 1.0);
        assert_relative_eq!(kappa(k_c), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_onsager_reference_values() {
        let t_c = critical_temperature(1.0, 1.0);
        assert_relative_eq!(free_energy_per_site(t_c, 1.0, 1.0), -2.1096511446082, epsilon = 1e-9);
        assert_relative_eq!(free_energy_per_site(1.0, 1.0, 1.0), -2.0003482837007, epsilon = 1e-9);
        assert_relative_eq!(free_energy_per_site(3.0, 1.0, 1.0), -2.4476481955732, epsilon = 1e-9);
    }

    #[test]
    fn test_limits() {
        // Ground state energy -2J per site as T -> 0.
        assert_relative_eq!(free_energy_per_site(0.2, 1.0, 1.0), -2.0, epsilon = 1e-8);
        // Entropy ln 2 per site dominates at high temperature.
        let t = 1000.0;
        assert_relative_eq!(free_energy_per_site(t, 1.0, 1.0) / t, -(2.0_f64).ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_coupling_scales_energy() {
        // f(T; J) = J f(T/J; 1)
        let f_scaled = free_energy_per_site(3.0, 1.5, 1.0);
        let f_unit = free_energy_per_site(2.0, 1.0, 1.0);
        assert_relative_eq!(f_scaled, 1.5 * f_unit, epsilon = 1e-9);
    }
}
