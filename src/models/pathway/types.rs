//! Core public types for the pathway sampler.

use super::priors::PathwayPriorConfig;
use crate::inference::{InferenceError, McmcConfig, TemperingSchedule};
use crate::input::InputError;
use thiserror::Error;

/// Errors returned by configuration, validation, and sampling.
#[derive(Debug, Error)]
pub enum PathwayError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error(transparent)]
    InvalidSchedule(#[from] InferenceError),
    #[error("invalid prior parameter `{parameter}`: {value}")]
    InvalidPriorParameter { parameter: &'static str, value: f64 },
    #[error("non-finite posterior parameter for {parameter} at iteration {iteration}")]
    NumericalFailure {
        parameter: &'static str,
        iteration: usize,
    },
    #[error("sampling cancelled after {completed} iterations")]
    Cancelled { completed: usize },
}

/// Named configurations of the three mode-selecting flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerMode {
    /// Plain regression, no adaptation, no shrinkage.
    PlainRegression,
    /// Adapts the baseline only.
    AdaptiveBaseline,
    /// Adapts the baseline with spike-and-slab shrinkage on activation.
    AdaptiveBaselineShrinkage,
    /// Full factor analysis, adapting baseline and signature with shrinkage.
    FullFactorAnalysis,
}

impl SamplerMode {
    /// Classify a flag combination, or `None` if it is not one of the four named modes.
    #[must_use]
    pub const fn from_flags(
        adaptive_baseline: bool,
        adaptive_signature: bool,
        mixture_activation: bool,
    ) -> Option<Self> {
        match (adaptive_baseline, adaptive_signature, mixture_activation) {
            (false, false, false) => Some(Self::PlainRegression),
            (true, false, false) => Some(Self::AdaptiveBaseline),
            (true, false, true) => Some(Self::AdaptiveBaselineShrinkage),
            (true, true, true) => Some(Self::FullFactorAnalysis),
            _ => None,
        }
    }

    /// Flag triple `(adaptive_baseline, adaptive_signature, mixture_activation)`.
    #[must_use]
    pub const fn flags(self) -> (bool, bool, bool) {
        match self {
            Self::PlainRegression => (false, false, false),
            Self::AdaptiveBaseline => (true, false, false),
            Self::AdaptiveBaselineShrinkage => (true, false, true),
            Self::FullFactorAnalysis => (true, true, true),
        }
    }
}

/// Sampler configuration for pathway-activation fitting.
#[derive(Debug, Clone, Copy)]
pub struct PathwayFitOptions {
    /// Total iterations; iteration 1 is the initial state.
    pub iterations: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Update the per-gene baseline.
    pub adaptive_baseline: bool,
    /// Update the signature matrix and its significance indicators.
    pub adaptive_signature: bool,
    /// Spike-and-slab mixture on activation levels.
    pub mixture_activation: bool,
    /// Replace draws by conditional modes (ECM) everywhere except the precision update.
    pub ecm: bool,
    /// Under ECM, also fix precision to `shape / rate` instead of sampling it.
    pub fix_precision_under_ecm: bool,
    /// Log progress at every 10% of the chain.
    pub report_progress: bool,
    /// Length of the signature tempering block.
    pub tempering_period: usize,
}

impl Default for PathwayFitOptions {
    fn default() -> Self {
        let schedule = McmcConfig::default();
        Self {
            iterations: schedule.iterations,
            seed: schedule.seed,
            adaptive_baseline: true,
            adaptive_signature: true,
            mixture_activation: true,
            ecm: false,
            fix_precision_under_ecm: false,
            report_progress: false,
            tempering_period: TemperingSchedule::default().period,
        }
    }
}

impl PathwayFitOptions {
    /// Options preset for one of the four named modes.
    #[must_use]
    pub fn for_mode(mode: SamplerMode) -> Self {
        let (adaptive_baseline, adaptive_signature, mixture_activation) = mode.flags();
        Self {
            adaptive_baseline,
            adaptive_signature,
            mixture_activation,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `PathwayError` if the schedule is invalid.
    pub fn validate(self) -> Result<(), PathwayError> {
        self.schedule().validate()?;
        self.tempering().validate()?;
        Ok(())
    }

    #[must_use]
    pub const fn mode(self) -> Option<SamplerMode> {
        SamplerMode::from_flags(
            self.adaptive_baseline,
            self.adaptive_signature,
            self.mixture_activation,
        )
    }

    #[must_use]
    pub const fn schedule(self) -> McmcConfig {
        McmcConfig {
            iterations: self.iterations,
            seed: self.seed,
        }
    }

    #[must_use]
    pub const fn tempering(self) -> TemperingSchedule {
        TemperingSchedule {
            period: self.tempering_period,
        }
    }

    /// Whether precision is fixed at its conditional mean rather than sampled.
    #[must_use]
    pub const fn fixes_precision(self) -> bool {
        self.ecm && self.fix_precision_under_ecm
    }
}

/// Full sampler configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathwaySamplerConfig {
    pub fit_options: PathwayFitOptions,
    pub prior_config: PathwayPriorConfig,
}

impl PathwaySamplerConfig {
    /// # Errors
    ///
    /// Returns `PathwayError` if any configuration block is invalid.
    pub fn validate(self) -> Result<(), PathwayError> {
        self.fit_options.validate()?;
        self.prior_config.validate()
    }
}
