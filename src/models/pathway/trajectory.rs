//! Per-iteration storage of every latent block.
//!
//! Which optional fields are present is decided once, from the three
//! mode-selecting flags, before sampling starts.

use faer::Mat;

use super::sampler::ChainState;
use super::types::PathwayFitOptions;
use crate::models::matrix_ops::hadamard;

/// Which optional trajectories a run records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryLayout {
    /// Baseline trajectory, present iff the baseline is adaptive.
    pub baseline: bool,
    /// Activation-indicator and effective-activation trajectories, present iff
    /// the activation mixture is enabled.
    pub activation_mixture: bool,
    /// Signature and signature-indicator trajectories, present iff the signature is adaptive.
    pub signature: bool,
}

impl TrajectoryLayout {
    #[must_use]
    pub const fn from_options(options: PathwayFitOptions) -> Self {
        Self {
            baseline: options.adaptive_baseline,
            activation_mixture: options.mixture_activation,
            signature: options.adaptive_signature,
        }
    }
}

/// Full chain output.
///
/// 2-D trajectories are stored as `iterations x n` matrices; 3-D trajectories
/// as one matrix per iteration.
#[derive(Debug, Clone)]
pub struct PathwayTrajectory {
    pub layout: TrajectoryLayout,
    /// Raw activation `beta`, one `m x k` matrix per iteration.
    pub activation: Vec<Mat<f64>>,
    /// Gene precisions, `iterations x n`.
    pub precision: Mat<f64>,
    /// Gene baselines, `iterations x n`.
    pub baseline: Option<Mat<f64>>,
    /// Activation indicators `gamma`, one `m x k` matrix per iteration.
    pub activation_indicator: Option<Vec<Mat<f64>>>,
    /// Effective activation `kappa = beta * gamma`, one `m x k` matrix per iteration.
    pub effective_activation: Option<Vec<Mat<f64>>>,
    /// Signature `S`, one `n x m` matrix per iteration.
    pub signature: Option<Vec<Mat<f64>>>,
    /// Signature indicators `delta`, one `n x m` matrix per iteration.
    pub signature_indicator: Option<Vec<Mat<f64>>>,
}

impl PathwayTrajectory {
    /// Number of recorded iterations.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.activation.len()
    }

    /// Effective activation at a 0-based trajectory index.
    ///
    /// Falls back to the raw activation when the mixture is disabled, since
    /// every indicator is then fixed at one.
    #[must_use]
    pub fn effective_activation_at(&self, index: usize) -> Option<&Mat<f64>> {
        self.effective_activation
            .as_ref()
            .map_or_else(|| self.activation.get(index), |kappa| kappa.get(index))
    }
}

pub(crate) struct TrajectoryRecorder {
    layout: TrajectoryLayout,
    next: usize,
    activation: Vec<Mat<f64>>,
    precision: Mat<f64>,
    baseline: Option<Mat<f64>>,
    activation_indicator: Option<Vec<Mat<f64>>>,
    effective_activation: Option<Vec<Mat<f64>>>,
    signature: Option<Vec<Mat<f64>>>,
    signature_indicator: Option<Vec<Mat<f64>>>,
}

impl TrajectoryRecorder {
    pub(crate) fn new(layout: TrajectoryLayout, iterations: usize, genes: usize) -> Self {
        let series = || Vec::with_capacity(iterations);
        Self {
            layout,
            next: 0,
            activation: Vec::with_capacity(iterations),
            precision: Mat::zeros(iterations, genes),
            baseline: layout.baseline.then(|| Mat::zeros(iterations, genes)),
            activation_indicator: layout.activation_mixture.then(series),
            effective_activation: layout.activation_mixture.then(series),
            signature: layout.signature.then(series),
            signature_indicator: layout.signature.then(series),
        }
    }

    pub(crate) fn record(&mut self, state: &ChainState) {
        let row = self.next;
        debug_assert!(row < self.precision.nrows());
        for (gene, value) in state.precision.iter().enumerate() {
            self.precision[(row, gene)] = *value;
        }
        if let Some(baseline) = self.baseline.as_mut() {
            for (gene, value) in state.baseline.iter().enumerate() {
                baseline[(row, gene)] = *value;
            }
        }
        self.activation.push(state.activation.clone());
        if let Some(indicators) = self.activation_indicator.as_mut() {
            indicators.push(state.activation_indicator.clone());
        }
        if let Some(kappa) = self.effective_activation.as_mut() {
            kappa.push(hadamard(&state.activation, &state.activation_indicator));
        }
        if let Some(signature) = self.signature.as_mut() {
            signature.push(state.signature.clone());
        }
        if let Some(indicators) = self.signature_indicator.as_mut() {
            indicators.push(state.signature_indicator.clone());
        }
        self.next += 1;
    }

    pub(crate) fn finish(self) -> PathwayTrajectory {
        PathwayTrajectory {
            layout: self.layout,
            activation: self.activation,
            precision: self.precision,
            baseline: self.baseline,
            activation_indicator: self.activation_indicator,
            effective_activation: self.effective_activation,
            signature: self.signature,
            signature_indicator: self.signature_indicator,
        }
    }
}
