//! Numeric aliases shared by the calibration objective and the solver.
//!
//! `Theta` and `Grad` live in the unconstrained optimizer space, so their
//! length is the number of free weight parameters of a calibration
//! structure; entries pinned at zero never appear here.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;

/// Free-parameter vector `θ`.
pub type Theta = Array1<f64>;

/// `∇ℓ(θ)` or `∇c(θ)`, same length as `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// L-BFGS history size when `MLEOptions::lbfgs_mem` is `None`.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS over this crate's numeric types, generic in the line search.
pub type Lbfgs<L> = LBFGS<L, Theta, Grad, Cost>;
