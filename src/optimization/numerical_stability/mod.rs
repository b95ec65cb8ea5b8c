//! numerical_stability — numerically robust scalar and row-wise transforms.
//!
//! Purpose
//! -------
//! Collect the stable transforms the calibration objective relies on:
//! softplus-based mappings between unconstrained optimizer space and
//! sign-constrained weights, probability clipping before logarithms, and a
//! max-shifted softmax.
//!
//! Key behaviors
//! -------------
//! - `safe_softplus` / `safe_softplus_inv` / `safe_logistic` map ℝ ↔ (0, ∞)
//!   and supply the chain-rule factor for sign-constrained weights.
//! - `clip_probability` keeps log-probabilities finite.
//! - `softmax_rows` / `log_softmax_rows` evaluate the multinomial link
//!   without overflow; `bounded_softmax_rows` additionally keeps every
//!   probability strictly inside `(0, 1)`.
//!
//! Conventions
//! -----------
//! - Pure functions over `f64` and `ndarray` views; no logging or I/O.
//! - Shape validation happens upstream in the calibration layer.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    LOG_LOSS_EPS, PROB_EPS, SOFTPLUS_FLOOR, bounded_softmax_rows, clip_probability,
    log_softmax_rows, safe_logistic, safe_softplus, safe_softplus_inv, softmax_rows,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::transformations::{
        PROB_EPS, clip_probability, safe_logistic, safe_softplus, safe_softplus_inv, softmax_rows,
    };
}
