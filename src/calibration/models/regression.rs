//! Optimizer driver: fit the multinomial objective for one or several
//! penalty strengths and select among them on validation data.
//!
//! Purpose
//! -------
//! Run one L-BFGS maximization per candidate λ, all from the same starting
//! point, and keep the fit with the lowest mean validation log-loss.
//!
//! Key behaviors
//! -------------
//! - [`fit_weights`] runs a single maximization and expands `θ̂` into `W`.
//! - [`fit_regularization_path`] loops over candidates sequentially; with
//!   more than one candidate a validation set is required and the first
//!   minimum of the validation loss wins.
//! - Non-convergence is not an error: the best point is kept and a warning
//!   is logged. Backend failures propagate as
//!   [`CalibError::OptimizationFailed`].
//!
//! Conventions
//! -----------
//! - Training loss inside the objective is an unnormalized sum; validation
//!   losses are per-sample means.
use ndarray::Array2;

use crate::{
    calibration::{
        core::{
            data::CalibrationData,
            metrics::log_loss,
            options::validate_candidates,
            structure::{PenaltyScope, WeightInit, WeightStructure},
            targets::ensure_multiple_classes,
        },
        errors::{CalibError, CalibResult},
        models::objective::{MultinomialObjective, class_probabilities},
    },
    optimization::loglik_optimizer::{MLEOptions, OptimOutcome, Theta, maximize},
};

/// Result of a single maximization.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    /// Fitted (k + 1) × (k − 1) weight matrix.
    pub weights: Array2<f64>,
    /// Penalty strength used for this fit.
    pub l2: f64,
    /// Optimizer diagnostics.
    pub outcome: OptimOutcome,
}

/// Result of fitting every candidate penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizationPath {
    /// The fit at the selected penalty.
    pub best: RegressionFit,
    /// Mean validation log-loss per candidate, in candidate order; empty
    /// when no validation set was supplied.
    pub validation_losses: Vec<f64>,
}

/// Maximize `objective` from `theta0` and expand the optimum into weights.
///
/// # Errors
/// `OptimizationFailed` for any optimizer or objective error.
pub fn fit_weights(
    objective: &MultinomialObjective, theta0: Theta, data: &CalibrationData, opts: &MLEOptions,
) -> CalibResult<RegressionFit> {
    let outcome = maximize(objective, theta0, data, opts)?;
    if !outcome.converged {
        log::warn!(
            "l2 = {}: optimizer stopped without converging after {} iterations ({})",
            objective.l2(),
            outcome.iterations,
            outcome.status
        );
    }
    let weights = objective.structure().expand(outcome.theta_hat.view());
    Ok(RegressionFit { weights, l2: objective.l2(), outcome })
}

/// Fit one model per candidate penalty and keep the best on validation data.
///
/// # Steps
/// 1. Validate candidates and require a validation set when there are
///    several of them.
/// 2. Check that the training targets contain at least two classes.
/// 3. Draw the initial weights once and encode them into `θ₀`.
/// 4. For each λ: maximize, then score mean log-loss on validation data.
/// 5. Keep the first candidate attaining the minimum loss.
///
/// # Errors
/// - `EmptyL2Candidates`, `InvalidL2`, `MissingValidationSet`.
/// - `DegenerateLabels` when training targets cover fewer than two classes.
/// - `ScoreShapeMismatch` if the validation set has a different class count.
/// - `InvalidWeightsInit` for a mis-shaped user start.
/// - `OptimizationFailed` from the optimizer.
pub fn fit_regularization_path(
    structure: &WeightStructure, scope: PenaltyScope, candidates: &[f64], init: &WeightInit,
    train: &CalibrationData, validation: Option<&CalibrationData>, opts: &MLEOptions,
) -> CalibResult<RegularizationPath> {
    validate_candidates(candidates)?;
    if candidates.len() > 1 && validation.is_none() {
        return Err(CalibError::MissingValidationSet { n_candidates: candidates.len() });
    }
    ensure_multiple_classes(train.indicator())?;
    if let Some(val) = validation {
        if val.n_classes() != structure.n_classes() {
            return Err(CalibError::ScoreShapeMismatch {
                expected: structure.n_classes(),
                actual: val.n_classes(),
            });
        }
    }

    let theta0 = structure.encode(&init.weights(structure.n_classes()))?;
    let mut best: Option<(RegressionFit, f64)> = None;
    let mut validation_losses = Vec::with_capacity(candidates.len());

    for &l2 in candidates {
        let objective = MultinomialObjective::new(structure.clone(), l2, scope);
        let fit = fit_weights(&objective, theta0.clone(), train, opts)?;
        let score = match validation {
            Some(val) => {
                let probs = class_probabilities(val.features(), fit.weights.view());
                let loss = log_loss(val.indicator(), probs.view(), true);
                validation_losses.push(loss);
                loss
            }
            None => 0.0,
        };
        let improves = match &best {
            None => true,
            Some((_, best_score)) => score < *best_score,
        };
        if improves {
            best = Some((fit, score));
        }
    }

    let (best, score) = best.ok_or(CalibError::EmptyL2Candidates)?;
    if validation.is_some() {
        log::debug!("selected l2 = {} (validation log-loss {:.6})", best.l2, score);
    }
    Ok(RegularizationPath { best, validation_losses })
}
