//! Prior specifications and log-density helpers for the pathway sampler.

use super::types::PathwayError;
use crate::inference::TemperingSchedule;

/// Hyperparameters for the sparse factor model.
///
/// Activation spike and slab are given as standard deviations (the prior
/// precision of an activation is `1 / scale^2`); signature spike and slab are
/// given as variances and are tempered during sampling.
///
/// With the activation mixture enabled, an indicator that drops to zero never
/// recovers: its activation is then confined to `(-inf, 0]`, and a negative
/// activation forces the indicator back to zero. At the default
/// `activation_probability` of 0.5 roughly half the indicators start inactive,
/// so raise it when most pathways are expected to be active.
#[derive(Debug, Clone, Copy)]
pub struct PathwayPriorConfig {
    /// Variance of the Normal prior on each gene baseline.
    pub baseline_variance: f64,
    /// Standard deviation of the inactive (spike) activation prior.
    pub activation_spike_scale: f64,
    /// Standard deviation of the active (slab) activation prior.
    pub activation_slab_scale: f64,
    /// Prior probability that a pathway is active in a sample.
    pub activation_probability: f64,
    /// Variance of the spike signature prior, centred at zero.
    pub signature_spike_variance: f64,
    /// Nominal variance of the slab signature prior, centred at the reference signature.
    pub signature_slab_variance: f64,
    /// Shape of the Gamma prior on gene precisions.
    pub precision_shape: f64,
    /// Rate of the Gamma prior on gene precisions.
    pub precision_rate: f64,
    /// Centre the baseline prior at zero and keep the baseline non-negative.
    pub baseline_zero_prior: bool,
    /// Centre the slab signature prior at zero instead of the reference value.
    pub signature_zero_prior: bool,
}

impl Default for PathwayPriorConfig {
    fn default() -> Self {
        Self {
            baseline_variance: 1.0,
            activation_spike_scale: 0.1,
            activation_slab_scale: 1.0,
            activation_probability: 0.5,
            signature_spike_variance: 0.01,
            signature_slab_variance: 1.0,
            precision_shape: 1.0,
            precision_rate: 1.0,
            baseline_zero_prior: false,
            signature_zero_prior: false,
        }
    }
}

impl PathwayPriorConfig {
    /// Whether all prior hyperparameters are numerically valid.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.validate().is_ok()
    }

    /// # Errors
    ///
    /// Returns `PathwayError::InvalidPriorParameter` naming the first invalid value.
    pub fn validate(self) -> Result<(), PathwayError> {
        let positive = [
            ("baseline_variance", self.baseline_variance),
            ("activation_spike_scale", self.activation_spike_scale),
            ("activation_slab_scale", self.activation_slab_scale),
            ("signature_spike_variance", self.signature_spike_variance),
            ("signature_slab_variance", self.signature_slab_variance),
            ("precision_shape", self.precision_shape),
            ("precision_rate", self.precision_rate),
        ];
        for (parameter, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(PathwayError::InvalidPriorParameter { parameter, value });
            }
        }
        let probability = self.activation_probability;
        if !(probability > 0.0 && probability < 1.0) {
            return Err(PathwayError::InvalidPriorParameter {
                parameter: "activation_probability",
                value: probability,
            });
        }
        Ok(())
    }

    /// Prior precision of an activation given its indicator.
    #[must_use]
    pub fn activation_precision(self, active: bool) -> f64 {
        let scale = if active {
            self.activation_slab_scale
        } else {
            self.activation_spike_scale
        };
        1.0 / (scale * scale)
    }

    /// Spike and slab signature variances tempered for a 1-based `iteration`.
    #[must_use]
    pub fn signature_variances(
        self,
        schedule: TemperingSchedule,
        iteration: usize,
    ) -> SignatureVariances {
        SignatureVariances {
            spike: schedule.effective_variance(self.signature_spike_variance, iteration),
            slab: schedule.effective_variance(self.signature_slab_variance, iteration),
        }
    }

    /// Initial precision, the prior mean `shape / rate`.
    #[must_use]
    pub fn precision_prior_mean(self) -> f64 {
        self.precision_shape / self.precision_rate
    }
}

/// Effective signature prior variances for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureVariances {
    pub spike: f64,
    pub slab: f64,
}

impl SignatureVariances {
    #[must_use]
    pub const fn select(self, included: bool) -> f64 {
        if included { self.slab } else { self.spike }
    }
}

/// Log-density for `Normal(mean, variance)`.
#[must_use]
pub fn log_normal_density(value: f64, mean: f64, variance: f64) -> f64 {
    if variance <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let centered = value - mean;
    -0.5 * (std::f64::consts::TAU.ln() + variance.ln() + centered * centered / variance)
}
