//! # Models
//!
//! The pathway factor model and the matrix helpers it is built on.

pub mod matrix_ops;
pub mod pathway;
