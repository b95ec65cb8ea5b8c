//! calibration — Dirichlet calibration of multi-class probability outputs.
//!
//! Purpose
//! -------
//! Learn a map from a classifier's predicted class probabilities to
//! calibrated probabilities: a multinomial logistic regression on
//! log-probabilities with a structured (k + 1) × (k − 1) weight matrix
//! (full, diagonal, or fixed-diagonal), fitted by L-BFGS on a penalized
//! log-loss.
//!
//! Key behaviors
//! -------------
//! - `core`: preprocessing, targets, weight structure, log-loss, options.
//! - `models`: objective, regularization-path driver, and
//!   [`DirichletCalibrator`](models::DirichletCalibrator).
//! - `errors`: [`CalibError`](errors::CalibError) and `CalibResult<T>`.
//!
//! Conventions
//! -----------
//! - Class `k − 1` is the reference class; weights are raveled row-major.
//! - Optimizer failures surface as `CalibError::OptimizationFailed`;
//!   non-convergence is reported through `OptimOutcome::converged` only.

pub mod core;
pub mod errors;
pub mod models;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::errors::{CalibError, CalibResult};
    pub use super::models::prelude::*;
}
