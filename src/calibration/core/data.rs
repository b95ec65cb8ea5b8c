//! Calibration data container handed to the objective.
//!
//! Purpose
//! -------
//! Hold the preprocessed design matrix `X′` (N × (k + 1)) and the
//! row-normalized indicator `Y` (N × k) for one fit or validation set, so the
//! objective never re-validates raw inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - `features` and `indicator` have the same number of rows, `N ≥ 1`.
//! - `features.ncols() == indicator.ncols() + 1` and `k ≥ 2`.
//! - `features` are finite (clipped logs plus a column of ones); every row
//!   of `indicator` is non-negative and sums to one.
use ndarray::{Array2, ArrayView2};

use crate::calibration::{
    core::{
        preprocess::{log_features, validate_scores},
        targets::Targets,
    },
    errors::CalibResult,
};

/// Preprocessed `(X′, Y)` pair for one data set.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationData {
    features: Array2<f64>,
    indicator: Array2<f64>,
}

impl CalibrationData {
    /// Validate raw scores and targets and preprocess them.
    ///
    /// The class count is the number of score columns.
    ///
    /// # Errors
    /// Score validation errors (`EmptyScores`, `TooFewClasses`,
    /// `NonFiniteScore`) and target errors from [`Targets::to_indicator`].
    pub fn new(scores: ArrayView2<f64>, targets: &Targets) -> CalibResult<Self> {
        validate_scores(scores)?;
        let indicator = targets.to_indicator(scores.nrows(), scores.ncols())?;
        Ok(CalibrationData { features: log_features(scores), indicator })
    }

    /// X′ = [ln clip(S), 1], shape N × (k + 1).
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Y, shape N × k.
    pub fn indicator(&self) -> ArrayView2<'_, f64> {
        self.indicator.view()
    }

    pub fn n_samples(&self) -> usize {
        self.indicator.nrows()
    }

    pub fn n_classes(&self) -> usize {
        self.indicator.ncols()
    }
}
