//! Numerical stability utilities.
//!
//! Provides safe implementations of common nonlinear transforms
//! that are prone to overflow/underflow in naïve form.
//! The scalar functions follow guarded strategies similar to those
//! in major ML libraries (e.g. PyTorch, TensorFlow), using explicit
//! cutoffs (`x > 20.0`) to keep `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`safe_softplus(x)`]: stable `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
//! - [`safe_softplus_inv(x)`]: inverse of softplus on (0, ∞).
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`, the softplus derivative.
//! - [`clip_probability`]: keep a probability inside `[ε, 1 − ε]`.
//! - [`log_softmax_rows`] / [`softmax_rows`]: max-shifted row-wise softmax.
//! - [`bounded_softmax_rows`]: softmax rows kept strictly inside `(0, 1)`.
//! - [`PROB_EPS`], [`LOG_LOSS_EPS`], [`SOFTPLUS_FLOOR`]: shared tolerances.
use ndarray::{Array2, ArrayView2, Axis};

/// Smallest representable increment for `f64`; probabilities are clipped to
/// `[PROB_EPS, 1 − PROB_EPS]` before taking logarithms.
pub const PROB_EPS: f64 = f64::EPSILON;

/// Clipping level used when scoring probabilities with the log-loss.
pub const LOG_LOSS_EPS: f64 = 1e-15;

/// Smallest magnitude mapped through [`safe_softplus_inv`] when encoding a
/// sign-constrained starting value; avoids `θ → −∞` for exact zeros.
pub const SOFTPLUS_FLOOR: f64 = 1e-3;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For `x > 20.0`, `softplus(x) ≈ x`.
/// - Otherwise `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: returns `t = ln(exp(x) - 1)`.
///
/// - For `x > 20.0`, `t ≈ x`.
/// - Otherwise `ln(expm1(x))`.
///
/// `x` must be finite and `> 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Numerically stable logistic function, `d/dx softplus(x)`.
///
/// Evaluates `exp(x) / (1 + exp(x))` on the branch that never exponentiates
/// a large positive number.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Clip a probability into `[eps, 1 − eps]`. `NaN` is passed through.
#[inline]
pub fn clip_probability(p: f64, eps: f64) -> f64 {
    p.clamp(eps, 1.0 - eps)
}

/// Row-wise log-softmax with max shift.
///
/// For each row `z`, returns `z - max(z) - ln Σ exp(z - max(z))`. All
/// entries are finite whenever the inputs are.
pub fn log_softmax_rows(logits: ArrayView2<f64>) -> Array2<f64> {
    let mut out = logits.to_owned();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let log_norm = row.fold(0.0, |acc, &v| acc + (v - max).exp()).ln();
        row.mapv_inplace(|v| v - max - log_norm);
    }
    out
}

/// Row-wise softmax with max shift. Each output row sums to one.
pub fn softmax_rows(logits: ArrayView2<f64>) -> Array2<f64> {
    let mut out = log_softmax_rows(logits);
    out.mapv_inplace(f64::exp);
    // Renormalize to absorb rounding in exp(log p).
    for mut row in out.rows_mut() {
        let total = row.sum();
        row.mapv_inplace(|v| v / total);
    }
    out
}

/// Row-wise softmax whose entries lie strictly inside `(0, 1)`.
///
/// Each entry of [`softmax_rows`] is clipped into `[eps, 1 − eps]` and the
/// row is renormalized. With at least two columns and `eps > 0`, an
/// underflowed class keeps a positive mass and the dominant class stays
/// below one.
pub fn bounded_softmax_rows(logits: ArrayView2<f64>, eps: f64) -> Array2<f64> {
    let mut out = softmax_rows(logits);
    for mut row in out.rows_mut() {
        row.mapv_inplace(|v| clip_probability(v, eps));
        let total = row.sum();
        row.mapv_inplace(|v| v / total);
    }
    out
}
