//! Log-probability preprocessing shared by fit and predict.
//!
//! Scores are clipped into `[ε, 1 − ε]` with `ε = f64::EPSILON`, mapped
//! through `ln`, and extended with a trailing bias column of ones. The same
//! transform must run at fit and predict time; every entry point in the
//! calibrator goes through [`log_features`].
use ndarray::{Array2, ArrayView1, ArrayView2, Axis, s};

use crate::{
    calibration::errors::{CalibError, CalibResult},
    optimization::numerical_stability::{PROB_EPS, clip_probability},
};

/// Check that a score matrix is usable: at least one row, at least two
/// columns, all entries finite.
///
/// # Errors
/// `EmptyScores`, `TooFewClasses`, or `NonFiniteScore` for the first
/// offending entry.
pub fn validate_scores(scores: ArrayView2<f64>) -> CalibResult<()> {
    if scores.nrows() == 0 {
        return Err(CalibError::EmptyScores);
    }
    if scores.ncols() < 2 {
        return Err(CalibError::TooFewClasses { n_classes: scores.ncols() });
    }
    for ((row, col), &value) in scores.indexed_iter() {
        if !value.is_finite() {
            return Err(CalibError::NonFiniteScore { row, col, value });
        }
    }
    Ok(())
}

/// Expand positive-class probabilities `p` into the two-column matrix
/// `[1 − p, p]`.
pub fn expand_binary(positive: ArrayView1<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((positive.len(), 2));
    for (mut row, &p) in out.axis_iter_mut(Axis(0)).zip(positive.iter()) {
        row[0] = 1.0 - p;
        row[1] = p;
    }
    out
}

/// Build the design matrix `X′ = [ln clip(S), 1]` of shape N × (k + 1).
///
/// Pure; never produces ±∞ for finite input.
pub fn log_features(scores: ArrayView2<f64>) -> Array2<f64> {
    let (n, k) = scores.dim();
    let mut features = Array2::ones((n, k + 1));
    features
        .slice_mut(s![.., ..k])
        .zip_mut_with(&scores, |dst, &p| *dst = clip_probability(p, PROB_EPS).ln());
    features
}
