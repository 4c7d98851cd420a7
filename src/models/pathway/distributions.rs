//! Random-variate generators used by the pathway sampler.
//!
//! Each generator has a scalar form and a form vectorised over parameter
//! slices. Mode helpers give the deterministic replacement used under ECM.

use rand::RngExt;
use rand::rngs::StdRng;
use statrs::distribution::{ContinuousCDF, Normal};

const EPS_PROBABILITY: f64 = 1.0e-12;
const MIN_SCALE: f64 = 1.0e-12;

/// Stable logistic transform.
#[must_use]
pub fn logistic_stable(value: f64) -> f64 {
    if value >= 0.0 {
        let z = (-value).exp();
        1.0 / (1.0 + z)
    } else {
        let z = value.exp();
        z / (1.0 + z)
    }
}

/// Bound probability away from exact 0 and 1.
#[must_use]
pub fn clamp_probability(probability: f64) -> f64 {
    probability.clamp(EPS_PROBABILITY, 1.0 - EPS_PROBABILITY)
}

pub fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    let u1 = (1.0_f64 - rng.random::<f64>()).max(f64::MIN_POSITIVE);
    let u2 = rng.random::<f64>();
    (-2.0_f64 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Gamma draw with the given `shape` and `scale` (Marsaglia-Tsang).
///
/// Returns `NaN` for non-positive parameters.
pub fn sample_gamma(rng: &mut StdRng, shape: f64, scale: f64) -> f64 {
    if !(shape > 0.0 && scale > 0.0) {
        return f64::NAN;
    }

    if shape < 1.0 {
        let u = (1.0_f64 - rng.random::<f64>()).max(f64::MIN_POSITIVE);
        return sample_gamma(rng, shape + 1.0, scale) * u.powf(1.0 / shape);
    }

    let shape_minus_third = shape - (1.0 / 3.0);
    let coeff = (1.0 / (9.0 * shape_minus_third)).sqrt();
    loop {
        let standard_normal = sample_standard_normal(rng);
        let one_plus_coeff_noise = coeff.mul_add(standard_normal, 1.0);
        if one_plus_coeff_noise <= 0.0 {
            continue;
        }
        let cubic_term = one_plus_coeff_noise * one_plus_coeff_noise * one_plus_coeff_noise;
        let uniform = rng.random::<f64>();
        if uniform
            < (0.0331 * standard_normal * standard_normal * standard_normal)
                .mul_add(-standard_normal, 1.0)
        {
            return scale * shape_minus_third * cubic_term;
        }
        if uniform.ln()
            < (0.5 * standard_normal).mul_add(
                standard_normal,
                shape_minus_third * (1.0 - cubic_term + cubic_term.ln()),
            )
        {
            return scale * shape_minus_third * cubic_term;
        }
    }
}

/// Mode of a normal truncated to `[lower, upper]`.
#[must_use]
pub fn truncated_normal_mode(mean: f64, lower: f64, upper: f64) -> f64 {
    mean.clamp(lower, upper)
}

/// One draw from `Normal(mean, sd^2)` restricted to `[lower, upper]`.
///
/// Uses the inverse CDF, reflecting intervals that lie entirely in the upper
/// tail so the CDF stays away from 1. When the scale is degenerate or the
/// interval carries no representable mass the nearest admissible point is
/// returned, so the result is finite whenever `mean` is.
pub fn truncated_normal_draw(rng: &mut StdRng, mean: f64, sd: f64, lower: f64, upper: f64) -> f64 {
    if !(sd > MIN_SCALE && sd.is_finite()) {
        return truncated_normal_mode(mean, lower, upper);
    }
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return truncated_normal_mode(mean, lower, upper);
    };

    let a = (lower - mean) / sd;
    let b = (upper - mean) / sd;
    let reflect = a > 0.0;
    let (lo, hi) = if reflect { (-b, -a) } else { (a, b) };

    let p_lo = standard_cdf(&normal, lo);
    let p_hi = standard_cdf(&normal, hi);
    if !(p_hi > p_lo) {
        return truncated_normal_mode(mean, lower, upper);
    }

    let u = rng.random::<f64>();
    let p = u
        .mul_add(p_hi - p_lo, p_lo)
        .clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON);
    let z = normal.inverse_cdf(p).clamp(lo, hi);
    let z = if reflect { -z } else { z };
    sd.mul_add(z, mean).clamp(lower, upper)
}

fn standard_cdf(normal: &Normal, value: f64) -> f64 {
    if value == f64::NEG_INFINITY {
        0.0
    } else if value == f64::INFINITY {
        1.0
    } else {
        normal.cdf(value)
    }
}

/// Vectorised truncated-normal draws; all slices must have equal length.
pub fn truncated_normal(
    rng: &mut StdRng,
    means: &[f64],
    sds: &[f64],
    lowers: &[f64],
    uppers: &[f64],
) -> Vec<f64> {
    debug_assert!(
        means.len() == sds.len() && means.len() == lowers.len() && means.len() == uppers.len()
    );
    means
        .iter()
        .zip(sds)
        .zip(lowers.iter().zip(uppers))
        .map(|((mean, sd), (lower, upper))| truncated_normal_draw(rng, *mean, *sd, *lower, *upper))
        .collect()
}

/// Binary draws with success probabilities clamped into `(0, 1)`.
pub fn bernoulli(rng: &mut StdRng, probabilities: &[f64]) -> Vec<f64> {
    probabilities
        .iter()
        .map(|probability| bernoulli_draw(rng, *probability))
        .collect()
}

pub fn bernoulli_draw(rng: &mut StdRng, probability: f64) -> f64 {
    if rng.random::<f64>() < clamp_probability(probability) {
        1.0
    } else {
        0.0
    }
}

/// Most probable outcome of a Bernoulli variable; ties resolve to 1.
#[must_use]
pub fn bernoulli_mode(probability: f64) -> f64 {
    if probability >= 0.5 { 1.0 } else { 0.0 }
}

/// Gamma draws sharing one `shape`, with a per-element `rate`.
pub fn gamma_draws(rng: &mut StdRng, shape: f64, rates: &[f64]) -> Vec<f64> {
    rates
        .iter()
        .map(|rate| sample_gamma(rng, shape, 1.0 / rate))
        .collect()
}
