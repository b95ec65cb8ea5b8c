//! optimization — L-BFGS stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used to fit calibration maps: an
//! Argmin-backed log-likelihood optimizer, numerically stable transforms,
//! and a single error/result surface. Callers implement a log-likelihood,
//! choose tolerances, and obtain fitted parameters plus diagnostics without
//! touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: maximize `ℓ(θ)` with L-BFGS (More–Thuente or
//!   Hager–Zhang line search) and analytic gradients.
//! - `numerical_stability`: softplus/logistic transforms for sign-constrained
//!   parameters, probability clipping, and stable softmax.
//! - `errors`: configuration, numerical, and backend failures normalized into
//!   [`errors::OptError`] with the alias `OptResult<T>`.
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; outcomes are
//!   reported in terms of `ℓ`.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Progress output is opt-in: with `obs_slog` and `MLEOptions::verbose`
//!   the runner logs the initial state through `log` and attaches the slog
//!   observer.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
