//! # Model inputs
//!
//! Defines the container for the expression matrix, the baseline estimate,
//! the pathway signature matrix and the prior gene-significance probabilities.
//!
//! # Examples
//!
//! ```
//! use faer::Mat;
//! use pathway_factor_models::PathwayModelInput;
//!
//! let expression = Mat::from_fn(4, 3, |i, j| (i + j) as f64);
//! let baseline = Mat::from_fn(4, 1, |_, _| 1.0);
//! let signature = Mat::from_fn(4, 2, |i, j| if i % 2 == j { 1.0 } else { -0.5 });
//! let significance_prior = Mat::from_fn(4, 2, |_, _| 0.5);
//! let input = PathwayModelInput::new(expression, baseline, signature, significance_prior);
//!
//! assert!(input.validate().is_ok());
//! assert_eq!(input.n_pathways(), 2);
//! ```
//!
//! ```
//! use faer::Mat;
//! use pathway_factor_models::PathwayModelInput;
//!
//! let expression = Mat::from_fn(4, 3, |_, _| 1.0);
//! let baseline = Mat::from_fn(4, 1, |_, _| 1.0);
//! let signature = Mat::from_fn(4, 1, |_, _| 1.0);
//! let significance_prior = Mat::from_fn(4, 1, |_, _| 1.0);
//! let input = PathwayModelInput::new(expression, baseline, signature, significance_prior);
//!
//! assert!(input.validate().is_err());
//! ```

use faer::Mat;
use thiserror::Error;

use crate::utils::matrix_is_finite;

/// Errors returned when validating model inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("expression matrix must have at least one gene and one sample")]
    EmptyExpression,
    #[error("signature matrix must have at least one pathway column")]
    EmptySignature,
    #[error("baseline must be a single column matrix")]
    InvalidBaselineShape,
    #[error(
        "expression rows ({expression_rows}), baseline rows ({baseline_rows}), signature rows ({signature_rows}) and prior rows ({prior_rows}) must match"
    )]
    DimensionMismatch {
        expression_rows: usize,
        baseline_rows: usize,
        signature_rows: usize,
        prior_rows: usize,
    },
    #[error("signature columns ({signature_cols}) must match prior probability columns ({prior_cols})")]
    PriorShapeMismatch {
        signature_cols: usize,
        prior_cols: usize,
    },
    #[error("{name} contains non-finite values")]
    NonFiniteMatrix { name: &'static str },
    #[error("prior probability at ({row}, {col}) must lie strictly inside (0, 1); found {value}")]
    InvalidPriorProbability { row: usize, col: usize, value: f64 },
}

/// Inputs for pathway-activation sampling.
///
/// Dimensions: `n` genes, `k` samples, `m` pathways.
#[derive(Debug, Clone)]
pub struct PathwayModelInput {
    /// Observed measurements, `n x k`.
    pub expression: Mat<f64>,
    /// Per-gene baseline estimate, `n x 1`.
    pub baseline: Mat<f64>,
    /// Reference pathway signature, `n x m`.
    pub signature: Mat<f64>,
    /// Prior probability that a gene is significant within a pathway, `n x m`.
    pub significance_prior: Mat<f64>,
}

impl PathwayModelInput {
    #[must_use]
    pub const fn new(
        expression: Mat<f64>,
        baseline: Mat<f64>,
        signature: Mat<f64>,
        significance_prior: Mat<f64>,
    ) -> Self {
        Self {
            expression,
            baseline,
            signature,
            significance_prior,
        }
    }

    #[must_use]
    pub fn n_genes(&self) -> usize {
        self.expression.nrows()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.expression.ncols()
    }

    #[must_use]
    pub fn n_pathways(&self) -> usize {
        self.signature.ncols()
    }

    /// Validate shapes and values.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if any input is malformed.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.expression.nrows() == 0 || self.expression.ncols() == 0 {
            return Err(InputError::EmptyExpression);
        }
        if self.signature.ncols() == 0 {
            return Err(InputError::EmptySignature);
        }
        if self.baseline.ncols() != 1 {
            return Err(InputError::InvalidBaselineShape);
        }
        let rows = self.expression.nrows();
        if self.baseline.nrows() != rows
            || self.signature.nrows() != rows
            || self.significance_prior.nrows() != rows
        {
            return Err(InputError::DimensionMismatch {
                expression_rows: rows,
                baseline_rows: self.baseline.nrows(),
                signature_rows: self.signature.nrows(),
                prior_rows: self.significance_prior.nrows(),
            });
        }
        if self.signature.ncols() != self.significance_prior.ncols() {
            return Err(InputError::PriorShapeMismatch {
                signature_cols: self.signature.ncols(),
                prior_cols: self.significance_prior.ncols(),
            });
        }
        for (name, matrix) in [
            ("expression", &self.expression),
            ("baseline", &self.baseline),
            ("signature", &self.signature),
            ("significance prior", &self.significance_prior),
        ] {
            if !matrix_is_finite(matrix) {
                return Err(InputError::NonFiniteMatrix { name });
            }
        }
        for row in 0..self.significance_prior.nrows() {
            for col in 0..self.significance_prior.ncols() {
                let value = self.significance_prior[(row, col)];
                if !(value > 0.0 && value < 1.0) {
                    return Err(InputError::InvalidPriorProbability { row, col, value });
                }
            }
        }
        Ok(())
    }
}
