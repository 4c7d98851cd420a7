//! Sparse factor model for pathway activation.
//!
//! Expression `Y` (genes x samples) is modelled as
//! `Y = B 1' + S (beta * gamma) + noise`, with gene-specific noise precision,
//! spike-and-slab priors on the activations and on the signature, and
//! tempered signature variances. The sampler runs either as a Gibbs chain or,
//! with `ecm` set, as a deterministic conditional-mode sweep.

mod conditional;
mod distributions;
mod mixture;
mod priors;
mod sampler;
mod trajectory;
mod types;

pub use conditional::{
    GaussianConditional, PrecisionConditional, activation_conditionals, baseline_conditionals,
    precision_conditional, signature_conditionals,
};
pub use distributions::{
    bernoulli, bernoulli_mode, gamma_draws, logistic_stable, truncated_normal,
    truncated_normal_draw, truncated_normal_mode,
};
pub use mixture::{
    activation_inclusion_probabilities, activation_inclusion_probability,
    signature_inclusion_probabilities, signature_inclusion_probability,
};
pub use priors::{PathwayPriorConfig, SignatureVariances, log_normal_density};
pub use sampler::{
    fit_pathway_input, fit_pathway_input_with_config, fit_pathway_input_with_observer,
};
pub use trajectory::{PathwayTrajectory, TrajectoryLayout};
pub use types::{PathwayError, PathwayFitOptions, PathwaySamplerConfig, SamplerMode};
