//! Spike-and-slab inclusion probabilities and indicator updates.

use faer::Mat;
use rand::rngs::StdRng;

use super::distributions::{bernoulli_draw, bernoulli_mode, logistic_stable};
use super::priors::{PathwayPriorConfig, SignatureVariances, log_normal_density};

/// Posterior probability that an activation value comes from the slab.
///
/// Negative values are incompatible with the active `[0, 1]` branch and get
/// probability zero.
#[must_use]
pub fn activation_inclusion_probability(value: f64, prior: &PathwayPriorConfig) -> f64 {
    if value < 0.0 {
        return 0.0;
    }
    let slab_variance = prior.activation_slab_scale * prior.activation_slab_scale;
    let spike_variance = prior.activation_spike_scale * prior.activation_spike_scale;
    let log_odds = prior_log_odds(prior.activation_probability)
        + log_normal_density(value, 0.0, slab_variance)
        - log_normal_density(value, 0.0, spike_variance);
    logistic_stable(log_odds)
}

/// Posterior probability that a gene is significant in a pathway.
///
/// The slab is centred at `slab_mean`, the spike at zero.
#[must_use]
pub fn signature_inclusion_probability(
    value: f64,
    slab_mean: f64,
    prior_probability: f64,
    variances: SignatureVariances,
) -> f64 {
    let log_odds = prior_log_odds(prior_probability)
        + log_normal_density(value, slab_mean, variances.slab)
        - log_normal_density(value, 0.0, variances.spike);
    logistic_stable(log_odds)
}

fn prior_log_odds(probability: f64) -> f64 {
    probability.ln() - (-probability).ln_1p()
}

#[must_use]
pub fn activation_inclusion_probabilities(
    activation: &Mat<f64>,
    prior: &PathwayPriorConfig,
) -> Mat<f64> {
    Mat::from_fn(activation.nrows(), activation.ncols(), |pathway, sample| {
        activation_inclusion_probability(activation[(pathway, sample)], prior)
    })
}

#[must_use]
pub fn signature_inclusion_probabilities(
    signature: &Mat<f64>,
    reference: &Mat<f64>,
    significance_prior: &Mat<f64>,
    variances: SignatureVariances,
    zero_prior: bool,
) -> Mat<f64> {
    Mat::from_fn(signature.nrows(), signature.ncols(), |gene, pathway| {
        let slab_mean = if zero_prior {
            0.0
        } else {
            reference[(gene, pathway)]
        };
        signature_inclusion_probability(
            signature[(gene, pathway)],
            slab_mean,
            significance_prior[(gene, pathway)],
            variances,
        )
    })
}

/// Redraw activation indicators from their inclusion probabilities.
///
/// A negative activation forces its indicator to zero without consuming a draw.
/// Under ECM each indicator takes its mode.
pub(crate) fn redraw_activation_indicators(
    indicators: &mut Mat<f64>,
    activation: &Mat<f64>,
    probabilities: &Mat<f64>,
    rng: &mut StdRng,
    ecm: bool,
) {
    for pathway in 0..indicators.nrows() {
        for sample in 0..indicators.ncols() {
            indicators[(pathway, sample)] = if activation[(pathway, sample)] < 0.0 {
                0.0
            } else {
                draw_indicator(probabilities[(pathway, sample)], rng, ecm)
            };
        }
    }
}

/// Redraw signature indicators from their inclusion probabilities.
pub(crate) fn redraw_signature_indicators(
    indicators: &mut Mat<f64>,
    probabilities: &Mat<f64>,
    rng: &mut StdRng,
    ecm: bool,
) {
    for gene in 0..indicators.nrows() {
        for pathway in 0..indicators.ncols() {
            indicators[(gene, pathway)] = draw_indicator(probabilities[(gene, pathway)], rng, ecm);
        }
    }
}

pub(crate) fn draw_indicator(probability: f64, rng: &mut StdRng, ecm: bool) -> f64 {
    if ecm {
        bernoulli_mode(probability)
    } else {
        bernoulli_draw(rng, probability)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn negative_activation_has_zero_probability() {
        let prior = PathwayPriorConfig::default();
        assert_relative_eq!(activation_inclusion_probability(-0.01, &prior), 0.0);
    }

    #[test]
    fn large_activation_favours_slab() {
        let prior = PathwayPriorConfig::default();
        let near_zero = activation_inclusion_probability(0.01, &prior);
        let large = activation_inclusion_probability(0.8, &prior);
        assert!(large > 0.99);
        assert!(near_zero < 0.5);
        assert!((0.0..=1.0).contains(&near_zero));
    }

    #[test]
    fn equal_densities_return_prior_probability() {
        let variances = SignatureVariances {
            spike: 1.0,
            slab: 1.0,
        };
        let probability = signature_inclusion_probability(0.3, 0.0, 0.2, variances);
        assert_relative_eq!(probability, 0.2, epsilon = 1.0e-12);
    }

    #[test]
    fn signature_probability_tracks_reference() {
        let variances = SignatureVariances {
            spike: 0.01,
            slab: 1.0,
        };
        let signature = Mat::from_fn(2, 1, |i, _| if i == 0 { 2.0 } else { 0.0 });
        let reference = Mat::from_fn(2, 1, |_, _| 2.0);
        let prior = Mat::from_fn(2, 1, |_, _| 0.5);
        let probabilities =
            signature_inclusion_probabilities(&signature, &reference, &prior, variances, false);
        assert!(probabilities[(0, 0)] > 0.99);
        assert!(probabilities[(1, 0)] < 0.1);
    }

    #[test]
    fn negative_activation_forces_indicator_off() {
        let mut rng = StdRng::seed_from_u64(4);
        let activation = Mat::from_fn(1, 3, |_, j| if j == 0 { -0.2 } else { 0.9 });
        let probabilities = Mat::from_fn(1, 3, |_, _| 1.0);
        let mut indicators = Mat::from_fn(1, 3, |_, _| 1.0);
        redraw_activation_indicators(&mut indicators, &activation, &probabilities, &mut rng, false);
        assert_relative_eq!(indicators[(0, 0)], 0.0);
        assert_relative_eq!(indicators[(0, 1)], 1.0);
        assert_relative_eq!(indicators[(0, 2)], 1.0);
    }

    #[test]
    fn ecm_indicators_take_their_mode() {
        let mut rng = StdRng::seed_from_u64(8);
        let probabilities = Mat::from_fn(2, 2, |i, j| if i == j { 0.7 } else { 0.3 });
        let mut indicators = Mat::<f64>::zeros(2, 2);
        redraw_signature_indicators(&mut indicators, &probabilities, &mut rng, true);
        assert_relative_eq!(indicators[(0, 0)], 1.0);
        assert_relative_eq!(indicators[(0, 1)], 0.0);
        assert_relative_eq!(indicators[(1, 1)], 1.0);
    }
}
