use super::{full_trace, DOWN, LEFT, RIGHT, UP};
use crate::error::TrgError;
use crate::model::IsingModel;
use tensornet::LabeledTensor;

/// Local Boltzmann-weight tensor of one lattice site, before normalization.
///
/// With `M = [[√cosh K, √sinh K], [√cosh K, -√sinh K]]` each entry is
/// `Σ_s M[s,u] M[s,r] M[s,d] M[s,l]`, so contracting two neighbouring copies
/// over a shared leg reproduces the bond weight `exp(K s s')`.
pub fn site_tensor(model: &IsingModel) -> Result<LabeledTensor, TrgError> {
    let k = model.reduced_coupling();
    let c = k.cosh().sqrt();
    let s = k.sinh().sqrt();
    let m = [[c, s], [c, -s]];

    let tensor = LabeledTensor::from_fn([UP, RIGHT, DOWN, LEFT], vec![2; 4], |legs| {
        m.iter()
            .map(|row| legs.iter().map(|&b| row[b]).product::<f64>())
            .sum()
    })?;
    Ok(tensor)
}

/// The normalized site tensor and the logarithm of the trace divided out.
pub fn initial_tensor(model: &IsingModel) -> Result<(LabeledTensor, f64), TrgError> {
    let tensor = site_tensor(model)?;
    let trace = full_trace(&tensor)?;
    if !trace.is_finite() || trace <= 0.0 {
        return Err(TrgError::DegenerateTrace(trace));
    }
    Ok((tensor.scale(1.0 / trace), trace.ln()))
}
