//! Errors for Dirichlet calibration (input validation, configuration checks,
//! and optimizer failures).
//!
//! This module defines [`CalibError`], used across the Rust core and, when the
//! `python-bindings` feature is enabled, converted into a Python `ValueError`.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Score entries must be finite; values outside `[0, 1]` are tolerated and
//!   clipped by the preprocessor.
//! - Optimizer/backend errors are normalized to
//!   [`CalibError::OptimizationFailed`] with a human-readable status.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Result alias for calibration operations.
pub type CalibResult<T> = Result<T, CalibError>;

/// Unified error type for calibration.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibError {
    // ---- Scores ----
    /// Score matrix has no rows.
    EmptyScores,

    /// A score entry is NaN/±inf.
    NonFiniteScore { row: usize, col: usize, value: f64 },

    /// At least two classes (columns) are required.
    TooFewClasses { n_classes: usize },

    /// Predict-time scores disagree with the fitted class count.
    ScoreShapeMismatch { expected: usize, actual: usize },

    // ---- Targets ----
    /// Number of targets differs from the number of score rows.
    TargetLengthMismatch { expected: usize, actual: usize },

    /// A label is outside `[0, n_classes)`.
    LabelOutOfRange { index: usize, label: usize, n_classes: usize },

    /// Indicator targets must have one column per class.
    TargetWidthMismatch { expected: usize, actual: usize },

    /// An indicator row is negative, non-finite, or sums to zero.
    InvalidTargetRow { row: usize, reason: &'static str },

    /// Fewer than two distinct classes appear in the targets.
    DegenerateLabels { distinct: usize },

    // ---- Configuration ----
    /// Unknown matrix type name.
    InvalidMatrixType { name: String },

    /// Regularization strengths must be finite and >= 0.
    InvalidL2 { value: f64, reason: &'static str },

    /// At least one regularization candidate is required.
    EmptyL2Candidates,

    /// Several regularization candidates need a validation set to choose from.
    MissingValidationSet { n_candidates: usize },

    /// Inverse regularization of the logistic variant must be finite and > 0.
    InvalidInverseRegularization { value: f64 },

    /// Initial weights do not have shape (k + 1) × (k − 1).
    InvalidWeightsInit { expected: (usize, usize), found: (usize, usize) },

    // ---- Estimation / optimizer ----
    /// Optimizer failed; include a human-readable status/reason.
    OptimizationFailed { status: String },

    /// Calibrator hasn't been fitted yet.
    ModelNotFitted,
}

impl std::error::Error for CalibError {}

impl std::fmt::Display for CalibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Scores ----
            CalibError::EmptyScores => write!(f, "Score matrix must contain at least one row."),
            CalibError::NonFiniteScore { row, col, value } => {
                write!(f, "Score at ({row}, {col}) must be finite, got {value}")
            }
            CalibError::TooFewClasses { n_classes } => {
                write!(f, "At least two classes are required, got {n_classes}")
            }
            CalibError::ScoreShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Score matrix has {actual} columns but the calibrator was fitted on {expected} classes"
                )
            }
            // ---- Targets ----
            CalibError::TargetLengthMismatch { expected, actual } => {
                write!(f, "Target length mismatch: expected {expected}, got {actual}")
            }
            CalibError::LabelOutOfRange { index, label, n_classes } => {
                write!(f, "Label {label} at index {index} is outside [0, {n_classes})")
            }
            CalibError::TargetWidthMismatch { expected, actual } => {
                write!(f, "Indicator targets must have {expected} columns, got {actual}")
            }
            CalibError::InvalidTargetRow { row, reason } => {
                write!(f, "Invalid target row {row}: {reason}")
            }
            CalibError::DegenerateLabels { distinct } => {
                write!(f, "Targets must contain at least two distinct classes, got {distinct}")
            }
            // ---- Configuration ----
            CalibError::InvalidMatrixType { name } => {
                write!(
                    f,
                    "Invalid matrix type '{name}': expected 'full', 'diagonal' or 'fixed_diagonal'"
                )
            }
            CalibError::InvalidL2 { value, reason } => {
                write!(f, "Invalid l2 regularization {value}: {reason}")
            }
            CalibError::EmptyL2Candidates => {
                write!(f, "At least one l2 regularization value must be provided.")
            }
            CalibError::MissingValidationSet { n_candidates } => {
                write!(
                    f,
                    "{n_candidates} l2 candidates were given but no validation set to select among them"
                )
            }
            CalibError::InvalidInverseRegularization { value } => {
                write!(f, "Inverse regularization C must be finite and > 0, got {value}")
            }
            CalibError::InvalidWeightsInit { expected, found } => {
                write!(f, "Initial weights must have shape {expected:?}, got {found:?}")
            }
            // ---- Estimation / optimizer ----
            CalibError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
            CalibError::ModelNotFitted => write!(f, "Calibrator hasn't been fitted yet."),
        }
    }
}

impl From<OptError> for CalibError {
    fn from(err: OptError) -> CalibError {
        CalibError::OptimizationFailed { status: err.to_string() }
    }
}

/// Convert a [`CalibError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<CalibError> for PyErr {
    fn from(err: CalibError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Optimizer errors keep their message when lifted into `CalibError`.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost { value: NaN }`.
    //
    // Expect
    // ------
    // - `CalibError::OptimizationFailed` whose status names the cost failure.
    fn opt_error_becomes_optimization_failed() {
        // Act
        let err = CalibError::from(OptError::NonFiniteCost { value: f64::NAN });

        // Assert
        match err {
            CalibError::OptimizationFailed { status } => {
                assert!(status.contains("Non-finite cost"), "status was {status}")
            }
            other => panic!("Expected OptimizationFailed, got {other:?}"),
        }
    }
}
