//! Objective trait, solver configuration, and the normalized solver result.
//!
//! A calibration objective reports `ℓ(θ) = −(loss + penalty)` and its
//! analytic gradient `∇ℓ(θ)`; the adapter minimizes `−ℓ`. [`MLEOptions`]
//! and [`Tolerances`] are validated once at construction, and
//! [`OptimOutcome`] carries the best `θ` back in terms of `ℓ`.
use std::str::FromStr;

use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Cost, Grad, Theta},
};

/// Objective maximized by [`maximize`](super::maximize).
///
/// - `value` returns `ℓ(θ)`; invalid inputs or a non-finite result are
///   reported as an [`OptError`].
/// - `check` runs once on the starting point, before any solver work.
/// - `grad` returns `∇ℓ(θ)` with the length of `θ`.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad>;
}

/// Line search used inside L-BFGS. Parsed case-insensitively from
/// `"MoreThuente"` or `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("morethuente") {
            Ok(LineSearcher::MoreThuente)
        } else if s.eq_ignore_ascii_case("hagerzhang") {
            Ok(LineSearcher::HagerZhang)
        } else {
            Err(OptError::InvalidLineSearch { name: s.to_string() })
        }
    }
}

/// L-BFGS settings for one calibration fit.
///
/// Fields
/// ------
/// - `tols`: stopping rules, see [`Tolerances`].
/// - `line_searcher`: More–Thuente or Hager–Zhang.
/// - `verbose`: with the `obs_slog` feature, log the starting point and
///   attach a terminal observer.
/// - `lbfgs_mem`: history size, `None` for
///   [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
///
/// Default
/// -------
/// `tol_grad = 1e-6`, no cost tolerance, `max_iter = 500`, More–Thuente,
/// quiet, default memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// # Errors
    /// `InvalidLBFGSMem` for a zero history size.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem { mem: 0 });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(500) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules: gradient norm, cost change, and iteration cap. Any may
/// be `None`, but not all three.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// # Errors
    /// - `NoTolerancesProvided` if every rule is `None`.
    /// - `InvalidTolerance` for a tolerance that is not finite and positive.
    /// - `InvalidMaxIter` for `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        for (name, tol) in [("gradient", tol_grad), ("cost", tol_cost)] {
            if let Some(value) = tol {
                if !value.is_finite() || value <= 0.0 {
                    return Err(OptError::InvalidTolerance { name, value });
                }
            }
        }
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter { max_iter: 0 });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of one [`maximize`](super::maximize) run.
///
/// - `theta_hat`: best free-parameter vector, all entries finite.
/// - `value`: `ℓ(θ̂)`, not the minimized cost.
/// - `converged`: the solver stopped on a tolerance, not on the iteration
///   cap, a timeout, or an interrupt.
/// - `status`: the termination status as text.
/// - `grad_norm`: norm of the last gradient, when the solver kept one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Normalize raw solver state.
    ///
    /// # Errors
    /// - `MissingThetaHat` / `InvalidThetaHat` for an absent or non-finite
    ///   estimate.
    /// - `NonFiniteCost` for a non-finite `value`.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: &TerminationStatus, iterations: u64,
        grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
        if let Some((index, &value)) = theta_hat.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaHat { index, value });
        }
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively and reject unknown names.
    //
    // Given
    // -----
    // - "hagerZHANG", "MoreThuente", and "backtracking".
    //
    // Expect
    // ------
    // - The first two parse; the last yields `InvalidLineSearch`.
    fn line_searcher_from_str_is_case_insensitive() {
        // Act / Assert
        assert_eq!("hagerZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MoreThuente".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert_eq!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { name: "backtracking".to_string() })
        );
    }

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` enforces at least one stopping rule and positivity.
    //
    // Given
    // -----
    // - All-`None` rules, a negative gradient tolerance, an infinite cost
    //   tolerance, and zero iterations.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidTolerance` naming the rule, and
    //   `InvalidMaxIter`.
    fn tolerances_reject_invalid_configurations() {
        // Act / Assert
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert_eq!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolerance { name: "gradient", value: -1.0 })
        );
        assert!(matches!(
            Tolerances::new(None, Some(f64::INFINITY), Some(10)),
            Err(OptError::InvalidTolerance { name: "cost", .. })
        ));
        assert_eq!(Tolerances::new(None, None, Some(0)), Err(OptError::InvalidMaxIter { max_iter: 0 }));
    }

    #[test]
    // Purpose
    // -------
    // A zero L-BFGS memory is rejected at construction.
    //
    // Given
    // -----
    // - Valid tolerances and `lbfgs_mem = Some(0)`.
    //
    // Expect
    // ------
    // - `OptError::InvalidLBFGSMem { mem: 0 }`.
    fn mle_options_reject_zero_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).expect("valid tolerances");

        // Act
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, Some(0));

        // Assert
        assert_eq!(opts, Err(OptError::InvalidLBFGSMem { mem: 0 }));
    }

    #[test]
    // Purpose
    // -------
    // Outcome normalization rejects unusable estimates and separates
    // tolerance stops from the iteration cap.
    //
    // Given
    // -----
    // - No estimate; an estimate holding infinity; finite estimates stopped
    //   by the gradient tolerance and by the iteration cap.
    //
    // Expect
    // ------
    // - `MissingThetaHat`, `InvalidThetaHat { index: 1 }`, then converged
    //   and not converged.
    fn outcome_validates_estimate_and_classifies_termination() {
        // Arrange
        let tol = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let cap = TerminationStatus::Terminated(TerminationReason::MaxItersReached);

        // Act / Assert
        assert_eq!(OptimOutcome::new(None, 0.0, &tol, 3, None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            OptimOutcome::new(Some(array![0.0, f64::INFINITY]), 0.0, &tol, 3, None),
            Err(OptError::InvalidThetaHat { index: 1, .. })
        ));
        let done = OptimOutcome::new(Some(array![1.0]), -2.0, &tol, 3, Some(array![0.0]))
            .expect("valid outcome");
        assert!(done.converged);
        assert_eq!(done.grad_norm, Some(0.0));
        let capped =
            OptimOutcome::new(Some(array![1.0]), -2.0, &cap, 500, None).expect("valid outcome");
        assert!(!capped.converged);
    }
}
