//! Reusable inference and MCMC utility types.
//!
//! Holds the chain schedule, the periodic tempering schedule used to loosen
//! spike-and-slab priors, and the observer hook invoked between iterations.

use thiserror::Error;

use crate::utils::usize_to_f64;

/// Errors for generic MCMC configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InferenceError {
    #[error("iterations must be positive")]
    InvalidIterations,
    #[error("tempering period must be positive")]
    InvalidTemperingPeriod,
}

/// Generic MCMC schedule for a single sequential chain.
#[derive(Debug, Clone, Copy)]
pub struct McmcConfig {
    /// Total iterations, counting the initial state as iteration 1.
    pub iterations: usize,
    pub seed: u64,
}

impl Default for McmcConfig {
    fn default() -> Self {
        Self {
            iterations: 2_000,
            seed: 42,
        }
    }
}

impl McmcConfig {
    /// # Errors
    ///
    /// Returns `InferenceError` if schedule values are invalid.
    pub const fn validate(self) -> Result<(), InferenceError> {
        if self.iterations == 0 {
            return Err(InferenceError::InvalidIterations);
        }
        Ok(())
    }
}

/// Periodic tempering of prior variances.
///
/// Within each block of `period` iterations the counter
/// `t = ((iteration - 1) mod period) + 1` runs from 1 to `period`. Variances are
/// multiplied by `1 + (period - t) / period`, which starts close to 2 and reaches
/// exactly 1 on the last iteration of every block, then resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperingSchedule {
    pub period: usize,
}

impl Default for TemperingSchedule {
    fn default() -> Self {
        Self { period: 500 }
    }
}

impl TemperingSchedule {
    /// # Errors
    ///
    /// Returns `InferenceError::InvalidTemperingPeriod` for a zero period.
    pub const fn validate(self) -> Result<(), InferenceError> {
        if self.period == 0 {
            return Err(InferenceError::InvalidTemperingPeriod);
        }
        Ok(())
    }

    /// Position of a 1-based `iteration` inside its tempering block, in `1..=period`.
    #[must_use]
    pub const fn counter(self, iteration: usize) -> usize {
        (iteration.saturating_sub(1) % self.period) + 1
    }

    /// Multiplicative variance factor for a 1-based `iteration`.
    #[must_use]
    pub fn factor(self, iteration: usize) -> f64 {
        let period = usize_to_f64(self.period);
        let counter = usize_to_f64(self.counter(iteration));
        1.0 + (period - counter) / period
    }

    /// Tempered version of a nominal variance.
    #[must_use]
    pub fn effective_variance(self, nominal: f64, iteration: usize) -> f64 {
        nominal * self.factor(iteration)
    }
}

/// Side-effecting hook called once per completed iteration.
///
/// Observers never influence chain state. `should_cancel` is consulted only at
/// the start of an iteration, so a cancelled chain never exposes a half-updated state.
pub trait ChainObserver {
    /// Called after `iteration` (1-based) of `total` has been recorded.
    fn on_iteration(&mut self, iteration: usize, total: usize) {
        let _ = (iteration, total);
    }

    /// Request a stop before the next iteration begins.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ChainObserver for NoopObserver {}

/// Observer that reports progress through the `log` facade at every 10% of a chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress {
    last_decile: usize,
}

impl ChainObserver for LogProgress {
    fn on_iteration(&mut self, iteration: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = iteration * 10 / total;
        if decile > self.last_decile {
            self.last_decile = decile;
            log::info!("sampler progress: {iteration}/{total} iterations ({}%)", decile * 10);
        }
    }
}

/// Forwards events to a primary observer and to an optional progress logger.
pub(crate) struct ObserverChain<'a> {
    pub primary: &'a mut dyn ChainObserver,
    pub progress: Option<LogProgress>,
}

impl ChainObserver for ObserverChain<'_> {
    fn on_iteration(&mut self, iteration: usize, total: usize) {
        self.primary.on_iteration(iteration, total);
        if let Some(progress) = self.progress.as_mut() {
            progress.on_iteration(iteration, total);
        }
    }

    fn should_cancel(&self) -> bool {
        self.primary.should_cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn config_validation_rejects_zero_iterations() {
        let config = McmcConfig {
            iterations: 0,
            ..McmcConfig::default()
        };
        assert_eq!(config.validate(), Err(InferenceError::InvalidIterations));
    }

    #[test]
    fn tempering_counter_resets_every_period() {
        let schedule = TemperingSchedule::default();
        assert_eq!(schedule.counter(1), 1);
        assert_eq!(schedule.counter(500), 500);
        assert_eq!(schedule.counter(501), 1);
        assert_eq!(schedule.counter(1000), 500);
    }

    #[test]
    fn tempering_returns_nominal_variance_at_block_end() {
        let schedule = TemperingSchedule::default();
        assert_relative_eq!(schedule.effective_variance(0.7, 500), 0.7);
        assert_relative_eq!(schedule.effective_variance(0.7, 1000), 0.7);
        assert!((schedule.effective_variance(0.7, 250) - 0.7).abs() > 0.1);
    }

    #[test]
    fn tempering_factor_decreases_within_block() {
        let schedule = TemperingSchedule { period: 10 };
        let factors: Vec<f64> = (1..=10).map(|iteration| schedule.factor(iteration)).collect();
        assert!(factors.windows(2).all(|pair| pair[0] > pair[1]));
        assert!(factors.iter().all(|factor| (1.0..2.0).contains(factor)));
    }

    #[test]
    fn zero_tempering_period_is_rejected() {
        let schedule = TemperingSchedule { period: 0 };
        assert_eq!(
            schedule.validate(),
            Err(InferenceError::InvalidTemperingPeriod)
        );
    }

    #[test]
    fn log_progress_tracks_deciles() {
        let mut progress = LogProgress::default();
        progress.on_iteration(5, 100);
        assert_eq!(progress.last_decile, 0);
        progress.on_iteration(25, 100);
        assert_eq!(progress.last_decile, 2);
        assert!(!progress.should_cancel());
    }
}
