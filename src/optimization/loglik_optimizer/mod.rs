//! loglik_optimizer — argmin-powered log-likelihood optimizer.
//!
//! Purpose
//! -------
//! Provide an Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)`. Models implement [`LogLikelihood`] with an
//! analytic gradient and call [`maximize`] to run L-BFGS with a
//! configurable line search and tolerances. The calibration objective is the
//! client: it reports the negated penalized multinomial log-loss as `ℓ(θ)`.
//!
//! Key behaviors
//! -------------
//! - Convert log-likelihoods into Argmin cost functions `c(θ) = -ℓ(θ)` via
//!   [`adapter::ArgMinAdapter`].
//! - [`maximize`] validates the initial guess with [`LogLikelihood::check`],
//!   builds the solver ([`builders`]), runs it ([`run::run_lbfgs`]), and
//!   normalizes the result into an [`OptimOutcome`].
//! - Non-finite costs and gradients are rejected inside the adapter, before
//!   they reach the line search.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer works in an unconstrained space; any bound or tie
//!   between parameters is expressed by the model through a
//!   reparameterization before values reach this layer.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid
//!   inputs as [`OptError`](crate::optimization::errors::OptError) values.
//! - [`OptimOutcome::value`] is expressed in terms of `ℓ`, never the cost.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign conventions ([`adapter`]), solver construction
//!   ([`builders`]), configuration and outcome checks ([`traits`]), and toy
//!   maximizations ([`api`]).
//! - The calibration objective's gradient is checked against central
//!   differences from `finitediff` in its own tests.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
