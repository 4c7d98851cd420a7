//! Closed-form conditional posteriors for the latent blocks.
//!
//! Every function here is pure: it reads the current chain values and returns
//! the parameters of the conditional distribution, leaving the draw (or the
//! ECM mode) to the sampler.

use faer::Mat;

use super::priors::{PathwayPriorConfig, SignatureVariances};
use crate::models::matrix_ops::{row_sums, row_sums_of_squares};
use crate::utils::usize_to_f64;

/// Normal conditional restricted to `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianConditional {
    pub mean: f64,
    pub variance: f64,
    pub lower: f64,
    pub upper: f64,
}

impl GaussianConditional {
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.variance.is_finite() && self.variance > 0.0
    }

    #[must_use]
    pub fn sd(&self) -> f64 {
        self.variance.sqrt()
    }

    fn from_precision(precision: f64, weighted_sum: f64, lower: f64, upper: f64) -> Self {
        let variance = 1.0 / precision;
        Self {
            mean: variance * weighted_sum,
            variance,
            lower,
            upper,
        }
    }
}

/// Gamma conditionals for the gene precisions: one shared shape, one rate per gene.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionConditional {
    pub shape: f64,
    pub rates: Vec<f64>,
}

impl PrecisionConditional {
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.shape.is_finite()
            && self.shape > 0.0
            && self.rates.iter().all(|rate| rate.is_finite() && *rate > 0.0)
    }

    /// Conditional means `shape / rate`.
    #[must_use]
    pub fn means(&self) -> Vec<f64> {
        self.rates.iter().map(|rate| self.shape / rate).collect()
    }
}

/// Baseline conditionals given `Y - S beta` (the residual with the baseline added back).
///
/// Precision is `k tau_g + 1 / baseline_variance`. The draw is non-negative when
/// the prior is centred at zero and unconstrained otherwise.
#[must_use]
pub fn baseline_conditionals(
    unexplained: &Mat<f64>,
    precision: &[f64],
    prior_mean: &[f64],
    prior: &PathwayPriorConfig,
) -> Vec<GaussianConditional> {
    let samples = usize_to_f64(unexplained.ncols());
    let prior_precision = 1.0 / prior.baseline_variance;
    let lower = if prior.baseline_zero_prior {
        0.0
    } else {
        f64::NEG_INFINITY
    };

    row_sums(unexplained)
        .into_iter()
        .zip(precision.iter().zip(prior_mean))
        .map(|(row_sum, (tau, mean))| {
            GaussianConditional::from_precision(
                samples.mul_add(*tau, prior_precision),
                tau.mul_add(row_sum, prior_precision * mean),
                lower,
                f64::INFINITY,
            )
        })
        .collect()
}

/// Activation conditionals for one `pathway` across all samples.
///
/// `partial_residual` must exclude the pathway's own contribution. With the
/// mixture enabled the prior precision and the truncation follow each sample's
/// indicator: `[0, 1]` when active, `(-inf, 0]` otherwise. Without the mixture
/// every sample uses the slab precision and `[0, 1]`.
#[must_use]
pub fn activation_conditionals(
    partial_residual: &Mat<f64>,
    signature: &Mat<f64>,
    pathway: usize,
    precision: &[f64],
    indicator: &Mat<f64>,
    mixture: bool,
    prior: &PathwayPriorConfig,
) -> Vec<GaussianConditional> {
    let genes = signature.nrows();
    let weighted_norm: f64 = (0..genes)
        .map(|gene| {
            let weight = signature[(gene, pathway)];
            weight * weight * precision[gene]
        })
        .sum();

    (0..partial_residual.ncols())
        .map(|sample| {
            let active = !mixture || indicator[(pathway, sample)] >= 0.5;
            let weighted_sum: f64 = (0..genes)
                .map(|gene| {
                    signature[(gene, pathway)] * precision[gene] * partial_residual[(gene, sample)]
                })
                .sum();
            let (lower, upper) = if active {
                (0.0, 1.0)
            } else {
                (f64::NEG_INFINITY, 0.0)
            };
            GaussianConditional::from_precision(
                prior.activation_precision(active) + weighted_norm,
                weighted_sum,
                lower,
                upper,
            )
        })
        .collect()
}

/// Signature conditionals for one `pathway` across all genes.
///
/// The indicator picks spike or slab variance; the slab is centred at the
/// reference value unless `zero_prior` is set. Draws keep the sign of the
/// reference: non-negative for positive references, non-positive otherwise.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn signature_conditionals(
    partial_residual: &Mat<f64>,
    activation: &Mat<f64>,
    pathway: usize,
    precision: &[f64],
    indicator: &Mat<f64>,
    reference: &Mat<f64>,
    variances: SignatureVariances,
    zero_prior: bool,
) -> Vec<GaussianConditional> {
    let samples = activation.ncols();
    let activation_norm: f64 = (0..samples)
        .map(|sample| activation[(pathway, sample)] * activation[(pathway, sample)])
        .sum();

    (0..partial_residual.nrows())
        .map(|gene| {
            let included = indicator[(gene, pathway)] >= 0.5;
            let variance = variances.select(included);
            let reference_value = reference[(gene, pathway)];
            let prior_mean = if included && !zero_prior {
                reference_value
            } else {
                0.0
            };
            let projection: f64 = (0..samples)
                .map(|sample| activation[(pathway, sample)] * partial_residual[(gene, sample)])
                .sum();
            let (lower, upper) = if reference_value > 0.0 {
                (0.0, f64::INFINITY)
            } else {
                (f64::NEG_INFINITY, 0.0)
            };
            GaussianConditional::from_precision(
                precision[gene].mul_add(activation_norm, 1.0 / variance),
                precision[gene].mul_add(projection, prior_mean / variance),
                lower,
                upper,
            )
        })
        .collect()
}

/// Precision conditionals: shape `a + k/2`, rate `b + sum(r^2)/2` per gene.
#[must_use]
pub fn precision_conditional(residual: &Mat<f64>, prior: &PathwayPriorConfig) -> PrecisionConditional {
    let shape = 0.5f64.mul_add(usize_to_f64(residual.ncols()), prior.precision_shape);
    let rates = row_sums_of_squares(residual)
        .into_iter()
        .map(|sum_sq| 0.5f64.mul_add(sum_sq, prior.precision_rate))
        .collect();
    PrecisionConditional { shape, rates }
}
