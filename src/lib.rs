#![forbid(unsafe_code)]

//! # `pathway_factor_models`
//!
//! Bayesian sparse factor model for estimating per-sample pathway activation
//! from gene-expression data and a reference pathway signature.
//!
//! Four nested model variants are available, from plain regression against a
//! fixed signature up to full factor analysis with adaptive baseline,
//! spike-and-slab activations and an adaptive, sign-constrained signature.
//! Every run returns the full per-iteration trajectory of the latent state.

pub mod inference;
pub mod input;
pub mod models;
pub mod utils;

pub use inference::{
    ChainObserver, InferenceError, LogProgress, McmcConfig, NoopObserver, TemperingSchedule,
};
pub use input::{InputError, PathwayModelInput};
pub mod matrix_ops {
    pub use crate::models::matrix_ops::*;
}

pub use models::pathway::{
    PathwayError, PathwayFitOptions, PathwayPriorConfig, PathwaySamplerConfig, PathwayTrajectory,
    SamplerMode, SignatureVariances, TrajectoryLayout, fit_pathway_input,
    fit_pathway_input_with_config, fit_pathway_input_with_observer,
};
