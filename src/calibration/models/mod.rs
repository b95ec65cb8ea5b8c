//! models — objective, optimizer driver, and the calibrator facade.
//!
//! Purpose
//! -------
//! Tie the structural building blocks from `calibration::core` to the
//! generic L-BFGS optimizer: a [`MultinomialObjective`] implementing
//! [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood),
//! a driver that fits one model per penalty candidate, and the
//! [`DirichletCalibrator`] users interact with.
//!
//! Key behaviors
//! -------------
//! - [`objective`]: penalized multinomial log-loss with analytic gradient in
//!   unconstrained `θ`-space, plus [`class_probabilities`] for prediction.
//! - [`regression`]: [`fit_weights`] for one λ, [`fit_regularization_path`]
//!   for a candidate list with validation-based selection.
//! - [`calibrator`]: fit/predict lifecycle, binary helpers, accessors.
//!
//! Invariants & assumptions
//! ------------------------
//! - The reference class `k − 1` always has logit 0.
//! - All candidates of one fit start from the same `θ₀`.
//! - A calibrator is either unfitted or holds weights, selected λ, and
//!   diagnostics from a single successful fit.
//!
//! Testing notes
//! -------------
//! - Unit tests check the analytic gradient against finite differences for
//!   every matrix type and penalty scope, λ selection against standalone
//!   fits, and the facade's error paths.
//! - `tests/integration_calibration_pipeline.rs` covers end-to-end
//!   calibration behavior.

pub mod calibrator;
pub mod objective;
pub mod regression;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::calibrator::DirichletCalibrator;
pub use self::objective::{MultinomialObjective, class_logits, class_probabilities};
pub use self::regression::{
    RegressionFit, RegularizationPath, fit_regularization_path, fit_weights,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::calibrator::DirichletCalibrator;
    pub use super::objective::MultinomialObjective;
}
