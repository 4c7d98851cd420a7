/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Shared numeric and matrix utilities for model implementations.
//
// Created on: 24 Jan 2026     Author: Tobias Kragholm
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities
//!
//! Shared helpers for finiteness checks, numeric conversions,
//! and working with faer matrices.

use faer::Mat;
use num_traits::ToPrimitive;

#[must_use]
pub fn matrix_is_finite(matrix: &Mat<f64>) -> bool {
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            if !matrix[(i, j)].is_finite() {
                return false;
            }
        }
    }
    true
}

#[must_use]
pub fn slice_is_finite(values: &[f64]) -> bool {
    values.iter().all(|value| value.is_finite())
}

/// Largest absolute elementwise difference between two equally shaped matrices.
#[must_use]
pub fn max_abs_diff(a: &Mat<f64>, b: &Mat<f64>) -> f64 {
    let mut max = 0.0;
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            let diff = (a[(i, j)] - b[(i, j)]).abs();
            if diff > max {
                max = diff;
            }
        }
    }
    max
}

#[must_use]
pub fn column_to_vec(column: &Mat<f64>) -> Vec<f64> {
    (0..column.nrows()).map(|row| column[(row, 0)]).collect()
}

#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}
