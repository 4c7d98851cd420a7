use faer::Mat;
use pathway_factor_models::{
    ChainObserver, InferenceError, InputError, PathwayError, PathwayFitOptions,
    PathwayModelInput, PathwayPriorConfig, PathwaySamplerConfig, SamplerMode, fit_pathway_input,
    fit_pathway_input_with_config, fit_pathway_input_with_observer,
};

fn small_input() -> PathwayModelInput {
    PathwayModelInput::new(
        Mat::from_fn(6, 3, |gene, sample| {
            if (gene + sample) % 2 == 0 { 1.5 } else { 0.5 }
        }),
        Mat::from_fn(6, 1, |_, _| 1.0),
        Mat::from_fn(6, 2, |gene, pathway| {
            if gene % 2 == pathway { 1.0 } else { -0.5 }
        }),
        Mat::from_fn(6, 2, |_, _| 0.5),
    )
}

fn short_options(iterations: usize) -> PathwayFitOptions {
    PathwayFitOptions {
        iterations,
        ..PathwayFitOptions::default()
    }
}

#[derive(Default)]
struct CountingObserver {
    seen: Vec<(usize, usize)>,
    cancel_after: Option<usize>,
}

impl ChainObserver for CountingObserver {
    fn on_iteration(&mut self, iteration: usize, total: usize) {
        self.seen.push((iteration, total));
    }

    fn should_cancel(&self) -> bool {
        self.cancel_after
            .is_some_and(|limit| self.seen.len() >= limit)
    }
}

#[test]
fn observer_sees_every_iteration_in_order() {
    let input = small_input();
    let mut observer = CountingObserver::default();
    let trajectory = fit_pathway_input_with_observer(
        &input,
        PathwaySamplerConfig {
            fit_options: PathwayFitOptions {
                report_progress: true,
                ..short_options(12)
            },
            ..PathwaySamplerConfig::default()
        },
        &mut observer,
    )
    .expect("fit should succeed");

    assert_eq!(trajectory.iterations(), 12);
    assert_eq!(observer.seen.len(), 12);
    assert!(
        observer
            .seen
            .iter()
            .enumerate()
            .all(|(index, (iteration, total))| *iteration == index + 1 && *total == 12)
    );
}

#[test]
fn observer_can_cancel_between_iterations() {
    let input = small_input();
    let mut observer = CountingObserver {
        cancel_after: Some(4),
        ..CountingObserver::default()
    };
    let err = fit_pathway_input_with_observer(
        &input,
        PathwaySamplerConfig {
            fit_options: short_options(20),
            ..PathwaySamplerConfig::default()
        },
        &mut observer,
    )
    .expect_err("cancelled run should not return a trajectory");

    assert!(matches!(err, PathwayError::Cancelled { completed: 4 }));
    assert_eq!(observer.seen.len(), 4);
}

#[test]
fn observer_does_not_change_the_chain() {
    let input = small_input();
    let config = PathwaySamplerConfig {
        fit_options: short_options(15),
        ..PathwaySamplerConfig::default()
    };
    let observed =
        fit_pathway_input_with_observer(&input, config, &mut CountingObserver::default())
            .expect("observed fit");
    let plain = fit_pathway_input_with_config(&input, config).expect("plain fit");
    assert!((&observed.precision - &plain.precision).norm_l2() < f64::EPSILON);
}

#[test]
fn zero_iterations_are_rejected() {
    let err = fit_pathway_input(&small_input(), short_options(0)).expect_err("should fail");
    assert!(matches!(
        err,
        PathwayError::InvalidSchedule(InferenceError::InvalidIterations)
    ));
}

#[test]
fn zero_tempering_period_is_rejected() {
    let options = PathwayFitOptions {
        tempering_period: 0,
        ..short_options(10)
    };
    let err = fit_pathway_input(&small_input(), options).expect_err("should fail");
    assert!(matches!(
        err,
        PathwayError::InvalidSchedule(InferenceError::InvalidTemperingPeriod)
    ));
}

#[test]
fn invalid_prior_names_the_parameter() {
    let config = PathwaySamplerConfig {
        fit_options: short_options(10),
        prior_config: PathwayPriorConfig {
            signature_slab_variance: 0.0,
            ..PathwayPriorConfig::default()
        },
    };
    let err = fit_pathway_input_with_config(&small_input(), config).expect_err("should fail");
    assert!(matches!(
        err,
        PathwayError::InvalidPriorParameter {
            parameter: "signature_slab_variance",
            ..
        }
    ));
    assert!(err.to_string().contains("signature_slab_variance"));
}

#[test]
fn mismatched_signature_rows_are_rejected() {
    let mut input = small_input();
    input.signature = Mat::from_fn(5, 2, |_, _| 1.0);
    let err = fit_pathway_input(&input, short_options(10)).expect_err("should fail");
    assert!(matches!(
        err,
        PathwayError::InvalidInput(InputError::DimensionMismatch { .. })
    ));
}

#[test]
fn mismatched_prior_columns_are_rejected() {
    let mut input = small_input();
    input.significance_prior = Mat::from_fn(6, 3, |_, _| 0.5);
    let err = fit_pathway_input(&input, short_options(10)).expect_err("should fail");
    assert!(matches!(err, PathwayError::InvalidInput(_)));
}

#[test]
fn degenerate_significance_prior_is_rejected() {
    let mut input = small_input();
    input.significance_prior[(2, 1)] = 1.0;
    let err = fit_pathway_input(&input, short_options(10)).expect_err("should fail");
    assert!(matches!(
        err,
        PathwayError::InvalidInput(InputError::InvalidPriorProbability { row: 2, col: 1, .. })
    ));
}

#[test]
fn overflowing_expression_aborts_without_trajectory() {
    let input = PathwayModelInput::new(
        Mat::from_fn(4, 3, |_, _| 1.0e200),
        Mat::from_fn(4, 1, |_, _| 1.0),
        Mat::from_fn(4, 2, |gene, pathway| {
            if gene % 2 == pathway { 1.0 } else { -0.5 }
        }),
        Mat::from_fn(4, 2, |_, _| 0.5),
    );
    assert!(input.validate().is_ok());
    let options = PathwayFitOptions {
        iterations: 5,
        ..PathwayFitOptions::for_mode(SamplerMode::FullFactorAnalysis)
    };
    let result = fit_pathway_input(&input, options);
    assert!(matches!(
        result,
        Err(PathwayError::NumericalFailure { iteration: 2, .. })
    ));
}

#[test]
fn unnamed_flag_combination_still_runs() {
    let options = PathwayFitOptions {
        adaptive_baseline: false,
        adaptive_signature: true,
        mixture_activation: false,
        ..short_options(8)
    };
    assert_eq!(options.mode(), None);
    let trajectory = fit_pathway_input(&small_input(), options).expect("fit should succeed");
    assert!(trajectory.baseline.is_none());
    assert!(trajectory.signature.is_some());
    assert!(trajectory.activation_indicator.is_none());
}

#[test]
fn named_mode_presets_validate() {
    for mode in [
        SamplerMode::PlainRegression,
        SamplerMode::AdaptiveBaseline,
        SamplerMode::AdaptiveBaselineShrinkage,
        SamplerMode::FullFactorAnalysis,
    ] {
        assert!(PathwayFitOptions::for_mode(mode).validate().is_ok());
    }
}
