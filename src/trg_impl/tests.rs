//! Tests for the renormalization group step and its bookkeeping

#[cfg(test)]
mod tests {
    use super::super::{
        coarse_grain, full_trace, initial_tensor, plaquette_plan, site_tensor, RgState, TrgRunner, DOWN, LEFT,
        MAX_STEPS, RIGHT, UP,
    };
    use crate::error::TrgError;
    use crate::model::IsingModel;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tensornet::LabeledTensor;

    fn random_tensor(seed: u64, dim: usize) -> LabeledTensor {
        let mut rng = StdRng::seed_from_u64(seed);
        LabeledTensor::from_fn([UP, RIGHT, DOWN, LEFT], vec![dim; 4], |_| rng.gen_range(-1.0..1.0)).unwrap()
    }

    #[test]
    fn test_site_tensor_entries() {
        let model = IsingModel::new(1.5);
        let k = model.reduced_coupling();
        let t = site_tensor(&model).unwrap();

        assert_eq!(t.legs(), &[UP, RIGHT, DOWN, LEFT]);
        assert_eq!(t.shape(), &[2, 2, 2, 2]);
        assert_relative_eq!(t.get(&[0, 0, 0, 0]).unwrap(), 2.0 * k.cosh().powi(2), epsilon = 1e-12);
        assert_relative_eq!(t.get(&[1, 1, 1, 1]).unwrap(), 2.0 * k.sinh().powi(2), epsilon = 1e-12);
        assert_relative_eq!(t.get(&[0, 0, 1, 1]).unwrap(), 2.0 * k.cosh() * k.sinh(), epsilon = 1e-12);
        // Odd number of excited legs cancels between the two spin states.
        assert_relative_eq!(t.get(&[1, 0, 0, 0]).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(t.get(&[1, 1, 1, 0]).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_site_tensor_is_rotation_invariant() {
        let t = site_tensor(&IsingModel::critical()).unwrap();
        let rotated = t.permute(&[RIGHT, DOWN, LEFT, UP]).unwrap().relabel(&[UP, RIGHT, DOWN, LEFT]).unwrap();
        for (a, b) in t.data().iter().zip(rotated.data()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_initial_tensor_has_unit_trace() {
        for temperature in [0.5, 1.0, 2.269185314213022, 3.0, 10.0] {
            let model = IsingModel::new(temperature);
            let (tensor, log_factor) = initial_tensor(&model).unwrap();
            assert_relative_eq!(full_trace(&tensor).unwrap(), 1.0, epsilon = 1e-12);
            // Tr T = 2 exp(2K)
            assert_relative_eq!(
                log_factor,
                2.0_f64.ln() + 2.0 * model.reduced_coupling(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_trace_order_does_not_matter() {
        let t = random_tensor(11, 5);
        let up_first = full_trace(&t).unwrap();
        let right_first = t.trace(RIGHT, LEFT).unwrap().trace(UP, DOWN).unwrap().item().unwrap();
        assert_relative_eq!(up_first, right_first, epsilon = 1e-12);
    }

    #[test]
    fn test_full_trace_requires_all_legs() {
        let t = LabeledTensor::zeros([UP, RIGHT, DOWN], vec![2, 2, 2]).unwrap();
        assert!(matches!(full_trace(&t), Err(TrgError::PlanViolation(_))));
    }

    #[test]
    fn test_plaquette_plan_exposes_one_leg_per_corner() {
        let plan = plaquette_plan().unwrap();
        assert_eq!(plan.external_labels(), vec!["C0_aux", "C1_aux", "C2_aux", "C3_aux"]);
        assert_eq!(plan.bonds().len(), 4);
    }

    #[test]
    fn test_coarse_grain_normalizes_and_caps_bond_dimension() {
        let (a, _) = initial_tensor(&IsingModel::critical()).unwrap();

        let coarse = coarse_grain(&a, 8).unwrap();
        assert_eq!(coarse.tensor.legs(), &[UP, RIGHT, DOWN, LEFT]);
        // A 2x2x2x2 tensor has only four modes per split.
        assert_eq!(coarse.tensor.shape(), &[4, 4, 4, 4]);
        assert_relative_eq!(full_trace(&coarse.tensor).unwrap(), 1.0, epsilon = 1e-12);
        assert!(coarse.log_factor.is_finite());
        assert_relative_eq!(coarse.truncation_error, 0.0, epsilon = 1e-12);

        // The site tensor has rank two across either diagonal, so the
        // discarded modes are exactly zero.
        let minimal = coarse_grain(&a, 2).unwrap();
        assert_eq!(minimal.tensor.shape(), &[2, 2, 2, 2]);
        assert_relative_eq!(minimal.truncation_error, 0.0, epsilon = 1e-12);
        assert_relative_eq!(minimal.log_factor, coarse.log_factor, epsilon = 1e-10);

        let truncated = coarse_grain(&coarse.tensor, 2).unwrap();
        assert!(truncated.truncation_error > 0.0);
        assert_relative_eq!(full_trace(&truncated.tensor).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_coarse_grain_rejects_zero_rank() {
        let (a, _) = initial_tensor(&IsingModel::critical()).unwrap();
        assert!(matches!(coarse_grain(&a, 0), Err(TrgError::InvalidConfig(_))));
    }

    #[test]
    fn test_state_doubles_sites_each_step() {
        let mut state = RgState::new(&IsingModel::critical()).unwrap();
        assert_eq!(state.n_spins(), &[1]);
        assert_eq!(state.log_factors().len(), 1);

        for _ in 0..5 {
            state.advance(4).unwrap();
            assert_relative_eq!(full_trace(state.tensor()).unwrap(), 1.0, epsilon = 1e-10);
        }
        assert_eq!(state.step(), 5);
        assert_eq!(state.n_spins(), &[1, 2, 4, 8, 16, 32]);
        assert_eq!(state.log_factors().len(), 6);
        assert_eq!(state.sites_per_copy(), 32);
    }

    #[test]
    fn test_failed_step_leaves_state_untouched() {
        let mut state = RgState::new(&IsingModel::critical()).unwrap();
        state.advance(4).unwrap();
        let before = state.clone();

        assert!(state.advance(0).is_err());
        assert_eq!(state.step(), before.step());
        assert_eq!(state.log_factors(), before.log_factors());
        assert_eq!(state.tensor(), before.tensor());
    }

    #[test]
    fn test_step_zero_estimate_is_single_site_bound() {
        let model = IsingModel::new(1.0);
        let mut runner = TrgRunner::with_exact_reference(model).unwrap();
        let estimates = runner.run(0, 4).unwrap();

        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates[0].step, 0);
        assert_eq!(estimates[0].sites_per_copy, 1);
        // -T (ln 2 + 2K) = -ln 2 - 2 at T = J = 1
        assert_relative_eq!(estimates[0].free_energy, -2.0_f64.ln() - 2.0, epsilon = 1e-12);
        let expected = (estimates[0].free_energy - runner.reference()) / runner.reference().abs();
        assert_relative_eq!(estimates[0].relative_error, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_runner_continues_from_current_state() {
        let mut runner = TrgRunner::with_exact_reference(IsingModel::new(3.0)).unwrap();
        let first = runner.run(2, 4).unwrap();
        let second = runner.run(2, 4).unwrap();

        assert_eq!(first.iter().map(|e| e.step).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(second.iter().map(|e| e.step).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(first[2], second[0]);
        assert_eq!(second[2].sites_per_copy, 16);
    }

    #[test]
    fn test_runner_rejects_bad_arguments_before_computing() {
        let mut runner = TrgRunner::with_exact_reference(IsingModel::critical()).unwrap();

        let err = runner.run(3, 0).unwrap_err();
        assert_eq!(err.step, 0);
        assert!(err.estimates.is_empty());
        assert!(matches!(err.source, TrgError::InvalidConfig(_)));

        let err = runner.run(MAX_STEPS + 1, 4).unwrap_err();
        assert!(err.estimates.is_empty());
        assert!(matches!(err.source, TrgError::InvalidConfig(_)));
        assert_eq!(runner.state().step(), 0);
    }

    #[test]
    fn test_huge_step_count_is_rejected_after_progress() {
        let mut runner = TrgRunner::with_exact_reference(IsingModel::critical()).unwrap();
        runner.run(1, 2).unwrap();

        let err = runner.run(usize::MAX, 2).unwrap_err();
        assert_eq!(err.step, 1);
        assert!(err.estimates.is_empty());
        assert!(matches!(err.source, TrgError::InvalidConfig(_)));
        assert_eq!(runner.state().step(), 1);

        let err = runner.run(MAX_STEPS, 2).unwrap_err();
        assert!(err.estimates.is_empty());
        assert_eq!(runner.state().step(), 1);
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        assert!(matches!(
            TrgRunner::with_exact_reference(IsingModel::new(0.0)),
            Err(TrgError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrgRunner::new(IsingModel::new(1.0).with_coupling(f64::INFINITY), -2.0),
            Err(TrgError::InvalidConfig(_))
        ));
    }
}
