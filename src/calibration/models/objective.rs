//! Multinomial regression objective in log-probability space.
//!
//! Purpose
//! -------
//! Evaluate the penalized multinomial log-loss of a structured weight matrix
//! and its analytic gradient with respect to the unconstrained optimizer
//! parameters, exposed through [`LogLikelihood`] so the generic L-BFGS
//! driver can maximize `ℓ(θ) = −(loss(θ) + penalty(θ))`.
//!
//! Key behaviors
//! -------------
//! - `θ → W` through [`WeightStructure::expand`]; fixed entries are 0 and
//!   sign-constrained entries pass through softplus.
//! - Logits `Z = X′·W` get an explicit zero column for the reference class
//!   before the max-shifted (log-)softmax.
//! - Loss `−Σ Y ⊙ log softmax(Z)` is an unnormalized sum over samples.
//! - Penalty `λ · Σ mask ⊙ W²`, with the mask chosen by [`PenaltyScope`].
//! - Gradient `G = X′ᵀ(P[:, :k−1] − Y[:, :k−1]) + 2λ·W ⊙ mask`, pulled back
//!   to `θ` through the structure.
//!
//! Invariants & assumptions
//! ------------------------
//! - `data` was built by [`CalibrationData::new`]: rows of `Y` sum to one and
//!   `X′` is finite.
//! - [`LogLikelihood::check`] guarantees `θ` has the structure's length before
//!   the optimizer starts; later evaluations rely on it.
use ndarray::{Array2, ArrayView2, s};

use crate::{
    calibration::core::{
        data::CalibrationData,
        structure::{PenaltyScope, WeightStructure},
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta},
        numerical_stability::{PROB_EPS, bounded_softmax_rows, log_softmax_rows, softmax_rows},
    },
};

/// Class logits `[X′·W, 0]`, shape N × k.
pub fn class_logits(features: ArrayView2<f64>, weights: ArrayView2<f64>) -> Array2<f64> {
    let free_classes = weights.ncols();
    let mut logits = Array2::zeros((features.nrows(), free_classes + 1));
    logits.slice_mut(s![.., ..free_classes]).assign(&features.dot(&weights));
    logits
}

/// Calibrated probabilities `softmax([X′·W, 0])`, shape N × k, with every
/// entry strictly inside `(0, 1)`.
pub fn class_probabilities(features: ArrayView2<f64>, weights: ArrayView2<f64>) -> Array2<f64> {
    bounded_softmax_rows(class_logits(features, weights).view(), PROB_EPS)
}

/// Penalized multinomial log-loss for one structure and penalty strength.
#[derive(Debug, Clone, PartialEq)]
pub struct MultinomialObjective {
    structure: WeightStructure,
    l2: f64,
    penalty_mask: Array2<f64>,
}

impl MultinomialObjective {
    pub fn new(structure: WeightStructure, l2: f64, scope: PenaltyScope) -> Self {
        let penalty_mask = structure.penalty_mask(scope);
        MultinomialObjective { structure, l2, penalty_mask }
    }

    pub fn structure(&self) -> &WeightStructure {
        &self.structure
    }

    pub fn l2(&self) -> f64 {
        self.l2
    }

    /// `λ · Σ mask ⊙ W²`.
    pub fn penalty(&self, weights: ArrayView2<f64>) -> f64 {
        if self.l2 == 0.0 {
            return 0.0;
        }
        let masked: f64 =
            weights.iter().zip(self.penalty_mask.iter()).map(|(w, m)| m * w * w).sum();
        self.l2 * masked
    }

    /// Unnormalized log-loss and penalty at explicit weights.
    pub fn loss_and_penalty(&self, weights: ArrayView2<f64>, data: &CalibrationData) -> (f64, f64) {
        let log_probs = log_softmax_rows(class_logits(data.features(), weights).view());
        let loss = -(&data.indicator() * &log_probs).sum();
        (loss, self.penalty(weights))
    }
}

impl LogLikelihood for MultinomialObjective {
    type Data = CalibrationData;

    /// `ℓ(θ) = −(loss + penalty)` at `W = expand(θ)`.
    ///
    /// # Errors
    /// `OptError::NonFiniteCost` if the penalized loss is not finite.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let weights = self.structure.expand(theta.view());
        let (loss, penalty) = self.loss_and_penalty(weights.view(), data);
        let total = loss + penalty;
        if !total.is_finite() {
            return Err(OptError::NonFiniteCost { value: total });
        }
        Ok(-total)
    }

    /// Reject `θ` of the wrong length or with non-finite entries, and data
    /// whose shapes disagree with the structure.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        let expected = self.structure.n_params();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        let features = data.features().dim();
        let targets = data.indicator().dim();
        let k = self.structure.n_classes();
        if features.0 != targets.0 || features.1 != k + 1 || targets.1 != k {
            return Err(OptError::ObjectiveShapeMismatch { features, targets });
        }
        Ok(())
    }

    /// `∇ℓ(θ)`: the negated pull-back of
    /// `X′ᵀ(P[:, :k−1] − Y[:, :k−1]) + 2λ·W ⊙ mask`.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let weights = self.structure.expand(theta.view());
        let free_classes = weights.ncols();
        let probs = softmax_rows(class_logits(data.features(), weights.view()).view());
        let residual = &probs.slice(s![.., ..free_classes])
            - &data.indicator().slice(s![.., ..free_classes]);
        let mut grad_w = data.features().t().dot(&residual);
        if self.l2 != 0.0 {
            grad_w.zip_mut_with(&(&weights * &self.penalty_mask), |g, &wm| *g += 2.0 * self.l2 * wm);
        }
        Ok(-self.structure.pull_back(&grad_w, theta.view()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calibration::core::{
            metrics::log_loss,
            structure::{MatrixType, identity_weights},
            targets::Targets,
        },
    };
    use approx::assert_relative_eq;
    use finitediff::FiniteDiff;
    use ndarray::Array1;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn synthetic_data(n: usize, k: usize, seed: u64) -> CalibrationData {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scores = Array2::from_shape_fn((n, k), |_| rng.gen::<f64>() + 0.05);
        for mut row in scores.rows_mut() {
            let total = row.sum();
            row.mapv_inplace(|v| v / total);
        }
        let labels: Vec<usize> = (0..n).map(|i| i % k).collect();
        CalibrationData::new(scores.view(), &Targets::from(labels)).expect("valid synthetic data")
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient matches central finite differences for every
    // matrix type and penalty scope.
    //
    // Given
    // -----
    // - 25 samples over k = 4 classes, λ = 0.3, θ drawn from a seeded RNG.
    //
    // Expect
    // ------
    // - Component-wise agreement to 1e-4 (scaled by 1 + |numeric|).
    fn analytic_gradient_matches_finite_differences() {
        let data = synthetic_data(25, 4, 11);
        let mut rng = StdRng::seed_from_u64(5);
        for matrix_type in [MatrixType::Full, MatrixType::Diagonal, MatrixType::FixedDiagonal] {
            for scope in [PenaltyScope::All, PenaltyScope::OffDiagonal, PenaltyScope::Coefficients]
            {
                // Arrange
                let structure = WeightStructure::new(4, matrix_type).expect("k >= 2");
                let objective = MultinomialObjective::new(structure, 0.3, scope);
                let theta: Theta =
                    Array1::from_shape_fn(objective.structure().n_params(), |_| {
                        rng.gen_range(-1.0..1.0)
                    });
                let func = |t: &Theta| objective.value(t, &data).unwrap_or(f64::NAN);

                // Act
                let analytic = objective.grad(&theta, &data).expect("analytic gradient");
                let numeric = theta.central_diff(&func);

                // Assert
                for (a, n) in analytic.iter().zip(numeric.iter()) {
                    assert!(
                        (a - n).abs() <= 1e-4 * (1.0 + n.abs()),
                        "{matrix_type}/{scope:?}: analytic {a} vs numeric {n}"
                    );
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // At the identity weights with no penalty the loss equals the raw
    // log-loss of the (renormalized) input scores.
    //
    // Given
    // -----
    // - Synthetic normalized scores, k = 3.
    //
    // Expect
    // ------
    // - `loss_and_penalty(I) == (Σ log-loss, 0)`.
    fn identity_weights_reproduce_input_log_loss() {
        // Arrange
        let data = synthetic_data(30, 3, 2);
        let structure = WeightStructure::new(3, MatrixType::Full).expect("k >= 2");
        let objective = MultinomialObjective::new(structure, 0.0, PenaltyScope::All);
        let identity = identity_weights(3);

        // Act
        let (loss, penalty) = objective.loss_and_penalty(identity.view(), &data);
        let probs = class_probabilities(data.features(), identity.view());
        let reference = data.features().slice(s![.., ..3]).mapv(f64::exp);

        // Assert
        assert_eq!(penalty, 0.0);
        assert_relative_eq!(loss, log_loss(data.indicator(), reference.view(), false), epsilon = 1e-9);
        for (p, r) in probs.iter().zip(reference.iter()) {
            assert_relative_eq!(*p, *r, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // The penalty only counts masked entries.
    //
    // Given
    // -----
    // - Identity weights for k = 3 with λ = 2 under each scope.
    //
    // Expect
    // ------
    // - All: 2 · (2 + 2) = 8; OffDiagonal: 0; Coefficients: 8.
    fn penalty_respects_scope() {
        let identity = identity_weights(3);
        let mk = |scope| {
            let structure = WeightStructure::new(3, MatrixType::Full).expect("k >= 2");
            MultinomialObjective::new(structure, 2.0, scope)
        };
        assert_eq!(mk(PenaltyScope::All).penalty(identity.view()), 8.0);
        assert_eq!(mk(PenaltyScope::OffDiagonal).penalty(identity.view()), 0.0);
        assert_eq!(mk(PenaltyScope::Coefficients).penalty(identity.view()), 8.0);
    }

    #[test]
    // Purpose
    // -------
    // `check` rejects θ of the wrong length and non-finite entries.
    //
    // Given
    // -----
    // - Diagonal structure for k = 3 (6 parameters).
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch { expected: 6, actual: 2 }`, then
    //   `InvalidThetaInput { index: 1 }`.
    fn check_rejects_bad_theta() {
        // Arrange
        let data = synthetic_data(6, 3, 1);
        let structure = WeightStructure::new(3, MatrixType::Diagonal).expect("k >= 2");
        let objective = MultinomialObjective::new(structure, 0.0, PenaltyScope::All);
        let mut theta = Array1::zeros(6);
        theta[1] = f64::INFINITY;

        // Act / Assert
        assert_eq!(
            objective.check(&Array1::zeros(2), &data),
            Err(OptError::ThetaLengthMismatch { expected: 6, actual: 2 })
        );
        assert!(matches!(
            objective.check(&theta, &data),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
        assert!(objective.check(&Array1::zeros(6), &data).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Probabilities are row-stochastic and the reference logit is zero.
    //
    // Given
    // -----
    // - Random features and weights for k = 4.
    //
    // Expect
    // ------
    // - Last logit column all zeros; probability rows sum to 1.
    fn reference_logit_is_zero_and_rows_sum_to_one() {
        // Arrange
        let data = synthetic_data(10, 4, 9);
        let weights = identity_weights(4).mapv(|w| 0.7 * w + 0.1);

        // Act
        let logits = class_logits(data.features(), weights.view());
        let probs = class_probabilities(data.features(), weights.view());

        // Assert
        assert!(logits.column(3).iter().all(|&z| z == 0.0));
        for row in probs.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }
}
