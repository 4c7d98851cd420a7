/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Gibbs / ECM sampler for the sparse pathway factor model.
//
// Created on: 24 Jan 2026     Author: Tobias Kragholm
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Sampler entrypoints for pathway-activation estimation.
//!
//! One chain runs sequentially. Iteration 1 is the initial state; every later
//! iteration updates, in order: baseline, activation (single-site sweep over
//! pathways), activation indicators, signature (per pathway), signature
//! indicators, and gene precisions.

use faer::Mat;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::conditional::{
    GaussianConditional, activation_conditionals, baseline_conditionals, precision_conditional,
    signature_conditionals,
};
use super::distributions::{gamma_draws, truncated_normal, truncated_normal_mode};
use super::mixture::{
    activation_inclusion_probabilities, draw_indicator, redraw_activation_indicators,
    redraw_signature_indicators, signature_inclusion_probabilities,
};
use super::priors::PathwayPriorConfig;
use super::trajectory::{PathwayTrajectory, TrajectoryLayout, TrajectoryRecorder};
use super::types::{PathwayError, PathwayFitOptions, PathwaySamplerConfig};
use crate::inference::{ChainObserver, LogProgress, NoopObserver, ObserverChain};
use crate::input::PathwayModelInput;
use crate::models::matrix_ops::{add_pathway_contribution, residual_matrix};
use crate::utils::{column_to_vec, matrix_is_finite, slice_is_finite};

/// Mutable latent state of one chain.
#[derive(Debug, Clone)]
pub(crate) struct ChainState {
    /// `n` gene baselines.
    pub baseline: Vec<f64>,
    /// `n x m` signature.
    pub signature: Mat<f64>,
    /// `m x k` raw activation.
    pub activation: Mat<f64>,
    /// `m x k` activation indicators.
    pub activation_indicator: Mat<f64>,
    /// `n x m` signature indicators.
    pub signature_indicator: Mat<f64>,
    /// `n` gene precisions.
    pub precision: Vec<f64>,
}

struct SamplerContext<'a> {
    input: &'a PathwayModelInput,
    options: PathwayFitOptions,
    prior: PathwayPriorConfig,
    baseline_prior_mean: Vec<f64>,
}

/// Fit the pathway model with default priors.
///
/// # Errors
///
/// Returns `PathwayError` if inputs/options are invalid or a posterior
/// parameter becomes non-finite.
pub fn fit_pathway_input(
    input: &PathwayModelInput,
    options: PathwayFitOptions,
) -> Result<PathwayTrajectory, PathwayError> {
    let config = PathwaySamplerConfig {
        fit_options: options,
        ..PathwaySamplerConfig::default()
    };
    fit_pathway_input_with_config(input, config)
}

/// Fit the pathway model with explicit prior settings.
///
/// # Errors
///
/// Returns `PathwayError` if inputs/options are invalid or a posterior
/// parameter becomes non-finite.
pub fn fit_pathway_input_with_config(
    input: &PathwayModelInput,
    config: PathwaySamplerConfig,
) -> Result<PathwayTrajectory, PathwayError> {
    fit_pathway_input_with_observer(input, config, &mut NoopObserver)
}

/// Fit the pathway model, reporting each completed iteration to `observer`.
///
/// The observer may cancel the run between iterations, in which case no
/// trajectory is returned.
///
/// # Errors
///
/// Returns `PathwayError` if inputs/options are invalid, a posterior parameter
/// becomes non-finite, or the observer cancels the run.
pub fn fit_pathway_input_with_observer(
    input: &PathwayModelInput,
    config: PathwaySamplerConfig,
    observer: &mut dyn ChainObserver,
) -> Result<PathwayTrajectory, PathwayError> {
    config.validate()?;
    input.validate()?;

    let options = config.fit_options;
    let prior = config.prior_config;
    let baseline_prior_mean = if prior.baseline_zero_prior {
        vec![0.0; input.n_genes()]
    } else {
        column_to_vec(&input.baseline)
    };
    let context = SamplerContext {
        input,
        options,
        prior,
        baseline_prior_mean,
    };

    log::debug!(
        "starting pathway sampler: mode {:?}, {} genes, {} samples, {} pathways, {} iterations, ecm={}",
        options.mode(),
        input.n_genes(),
        input.n_samples(),
        input.n_pathways(),
        options.iterations,
        options.ecm
    );

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut state = context.initial_state(&mut rng);
    let mut observers = ObserverChain {
        primary: observer,
        progress: options.report_progress.then(LogProgress::default),
    };
    let trajectory = run_chain(&context, &mut rng, &mut state, &mut observers)?;

    log::info!(
        "pathway sampler finished {} iterations",
        trajectory.iterations()
    );
    Ok(trajectory)
}

fn run_chain(
    context: &SamplerContext<'_>,
    rng: &mut StdRng,
    state: &mut ChainState,
    observer: &mut dyn ChainObserver,
) -> Result<PathwayTrajectory, PathwayError> {
    let options = context.options;
    let total = options.iterations;
    let mut recorder = TrajectoryRecorder::new(
        TrajectoryLayout::from_options(options),
        total,
        context.input.n_genes(),
    );

    recorder.record(state);
    observer.on_iteration(1, total);

    for iteration in 2..=total {
        if observer.should_cancel() {
            log::warn!("pathway sampler cancelled before iteration {iteration}");
            return Err(PathwayError::Cancelled {
                completed: iteration - 1,
            });
        }

        if options.adaptive_baseline {
            context.update_baseline(rng, state, iteration)?;
        }
        context.update_activation(rng, state, iteration)?;
        if options.mixture_activation {
            context.update_activation_indicators(rng, state, iteration)?;
        }
        if options.adaptive_signature {
            context.update_signature(rng, state, iteration)?;
            context.update_signature_indicators(rng, state, iteration)?;
        }
        context.update_precision(rng, state, iteration)?;

        recorder.record(state);
        log::trace!("pathway sampler completed iteration {iteration}/{total}");
        observer.on_iteration(iteration, total);
    }

    Ok(recorder.finish())
}

impl SamplerContext<'_> {
    fn initial_state(&self, rng: &mut StdRng) -> ChainState {
        let input = self.input;
        let genes = input.n_genes();
        let pathways = input.n_pathways();
        let ecm = self.options.ecm;

        let baseline = if self.options.adaptive_baseline {
            let conditionals = vec![
                GaussianConditional {
                    mean: 0.0,
                    variance: self.prior.baseline_variance,
                    lower: 0.0,
                    upper: f64::INFINITY,
                };
                genes
            ];
            self.draw_gaussian(rng, &conditionals)
        } else {
            column_to_vec(&input.baseline)
        };

        let mut activation_indicator = Mat::from_fn(pathways, input.n_samples(), |_, _| 1.0);
        if self.options.mixture_activation {
            let probability = self.prior.activation_probability;
            for pathway in 0..pathways {
                for sample in 0..input.n_samples() {
                    activation_indicator[(pathway, sample)] = draw_indicator(probability, rng, ecm);
                }
            }
        }

        let mut signature_indicator = input.significance_prior.clone();
        if self.options.adaptive_signature {
            for gene in 0..genes {
                for pathway in 0..pathways {
                    signature_indicator[(gene, pathway)] =
                        draw_indicator(input.significance_prior[(gene, pathway)], rng, ecm);
                }
            }
        }

        ChainState {
            baseline,
            signature: input.signature.clone(),
            activation: Mat::zeros(pathways, input.n_samples()),
            activation_indicator,
            signature_indicator,
            precision: vec![self.prior.precision_prior_mean(); genes],
        }
    }

    /// Draw from each truncated-normal conditional, or take its mode under ECM.
    fn draw_gaussian(&self, rng: &mut StdRng, conditionals: &[GaussianConditional]) -> Vec<f64> {
        if self.options.ecm {
            return conditionals
                .iter()
                .map(|c| truncated_normal_mode(c.mean, c.lower, c.upper))
                .collect();
        }
        let means: Vec<f64> = conditionals.iter().map(|c| c.mean).collect();
        let sds: Vec<f64> = conditionals.iter().map(GaussianConditional::sd).collect();
        let lowers: Vec<f64> = conditionals.iter().map(|c| c.lower).collect();
        let uppers: Vec<f64> = conditionals.iter().map(|c| c.upper).collect();
        truncated_normal(rng, &means, &sds, &lowers, &uppers)
    }

    fn checked_draw(
        &self,
        rng: &mut StdRng,
        conditionals: &[GaussianConditional],
        parameter: &'static str,
        iteration: usize,
    ) -> Result<Vec<f64>, PathwayError> {
        if !conditionals.iter().all(GaussianConditional::is_finite) {
            return Err(PathwayError::NumericalFailure {
                parameter,
                iteration,
            });
        }
        let draws = self.draw_gaussian(rng, conditionals);
        if !slice_is_finite(&draws) {
            return Err(PathwayError::NumericalFailure {
                parameter,
                iteration,
            });
        }
        Ok(draws)
    }

    fn residual(&self, state: &ChainState) -> Mat<f64> {
        residual_matrix(
            &self.input.expression,
            &state.baseline,
            &state.signature,
            &state.activation,
        )
    }

    fn update_baseline(
        &self,
        rng: &mut StdRng,
        state: &mut ChainState,
        iteration: usize,
    ) -> Result<(), PathwayError> {
        let zeros = vec![0.0; state.baseline.len()];
        let unexplained = residual_matrix(
            &self.input.expression,
            &zeros,
            &state.signature,
            &state.activation,
        );
        let conditionals = baseline_conditionals(
            &unexplained,
            &state.precision,
            &self.baseline_prior_mean,
            &self.prior,
        );
        state.baseline = self.checked_draw(rng, &conditionals, "baseline", iteration)?;
        Ok(())
    }

    /// Single-site sweep: each pathway conditions on the freshest values of the others.
    fn update_activation(
        &self,
        rng: &mut StdRng,
        state: &mut ChainState,
        iteration: usize,
    ) -> Result<(), PathwayError> {
        let mut residual = self.residual(state);
        for pathway in 0..state.activation.nrows() {
            add_pathway_contribution(
                &mut residual,
                &state.signature,
                &state.activation,
                pathway,
                1.0,
            );
            let conditionals = activation_conditionals(
                &residual,
                &state.signature,
                pathway,
                &state.precision,
                &state.activation_indicator,
                self.options.mixture_activation,
                &self.prior,
            );
            let draws = self.checked_draw(rng, &conditionals, "activation", iteration)?;
            for (sample, value) in draws.into_iter().enumerate() {
                state.activation[(pathway, sample)] = value;
            }
            add_pathway_contribution(
                &mut residual,
                &state.signature,
                &state.activation,
                pathway,
                -1.0,
            );
        }
        Ok(())
    }

    fn update_activation_indicators(
        &self,
        rng: &mut StdRng,
        state: &mut ChainState,
        iteration: usize,
    ) -> Result<(), PathwayError> {
        let probabilities = activation_inclusion_probabilities(&state.activation, &self.prior);
        if !matrix_is_finite(&probabilities) {
            return Err(PathwayError::NumericalFailure {
                parameter: "activation indicator",
                iteration,
            });
        }
        redraw_activation_indicators(
            &mut state.activation_indicator,
            &state.activation,
            &probabilities,
            rng,
            self.options.ecm,
        );
        Ok(())
    }

    fn update_signature(
        &self,
        rng: &mut StdRng,
        state: &mut ChainState,
        iteration: usize,
    ) -> Result<(), PathwayError> {
        let variances = self
            .prior
            .signature_variances(self.options.tempering(), iteration);
        let mut residual = self.residual(state);
        for pathway in 0..state.signature.ncols() {
            add_pathway_contribution(
                &mut residual,
                &state.signature,
                &state.activation,
                pathway,
                1.0,
            );
            let conditionals = signature_conditionals(
                &residual,
                &state.activation,
                pathway,
                &state.precision,
                &state.signature_indicator,
                &self.input.signature,
                variances,
                self.prior.signature_zero_prior,
            );
            let draws = self.checked_draw(rng, &conditionals, "signature", iteration)?;
            for (gene, value) in draws.into_iter().enumerate() {
                state.signature[(gene, pathway)] = value;
            }
            add_pathway_contribution(
                &mut residual,
                &state.signature,
                &state.activation,
                pathway,
                -1.0,
            );
        }
        Ok(())
    }

    fn update_signature_indicators(
        &self,
        rng: &mut StdRng,
        state: &mut ChainState,
        iteration: usize,
    ) -> Result<(), PathwayError> {
        let variances = self
            .prior
            .signature_variances(self.options.tempering(), iteration);
        let probabilities = signature_inclusion_probabilities(
            &state.signature,
            &self.input.signature,
            &self.input.significance_prior,
            variances,
            self.prior.signature_zero_prior,
        );
        if !matrix_is_finite(&probabilities) {
            return Err(PathwayError::NumericalFailure {
                parameter: "signature indicator",
                iteration,
            });
        }
        redraw_signature_indicators(
            &mut state.signature_indicator,
            &probabilities,
            rng,
            self.options.ecm,
        );
        Ok(())
    }

    /// Precision is sampled even under ECM unless `fix_precision_under_ecm` is set.
    fn update_precision(
        &self,
        rng: &mut StdRng,
        state: &mut ChainState,
        iteration: usize,
    ) -> Result<(), PathwayError> {
        let conditional = precision_conditional(&self.residual(state), &self.prior);
        if !conditional.is_finite() {
            return Err(PathwayError::NumericalFailure {
                parameter: "precision",
                iteration,
            });
        }
        let precision = if self.options.fixes_precision() {
            conditional.means()
        } else {
            gamma_draws(rng, conditional.shape, &conditional.rates)
        };
        if !precision.iter().all(|tau| tau.is_finite() && *tau > 0.0) {
            return Err(PathwayError::NumericalFailure {
                parameter: "precision",
                iteration,
            });
        }
        state.precision = precision;
        Ok(())
    }
}
