//! DirichletCalibrator — user-facing calibration map.
//!
//! Purpose
//! -------
//! Wrap preprocessing, the weight structure, the regularization path, and
//! prediction behind one stateful object with an sklearn-like surface:
//! construct with a [`CalibratorKind`] and [`CalibOptions`], `fit`, then
//! `predict_proba`.
//!
//! Key behaviors
//! -------------
//! - `fit` validates scores and targets, builds the [`WeightStructure`] for
//!   `k = scores.ncols()`, resolves the penalty plan, and runs
//!   [`fit_regularization_path`]. A new `fit` replaces every piece of
//!   derived state; a failed `fit` leaves the calibrator unfitted.
//! - `predict_proba` applies the same log-feature transform and returns an
//!   N × k row-stochastic matrix.
//! - Binary helpers accept positive-class probabilities, expand them to
//!   `[1 − p, p]`, and slice outputs back to the positive column.
//! - Accessors expose `coef`, `intercept`, raw weights, the selected penalty,
//!   validation losses, and optimizer diagnostics.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fitted weights satisfy the structure's bounds exactly (fixed entries
//!   are 0, sign constraints hold).
//! - Predictions are read-only and deterministic given the fitted weights.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use dirichlet_calibration::calibration::prelude::*;
//! use ndarray::array;
//!
//! let scores = array![[0.7, 0.2, 0.1], [0.1, 0.8, 0.1], [0.3, 0.3, 0.4]];
//! let mut cal = DirichletCalibrator::new(MatrixType::Full.into(), CalibOptions::default());
//! cal.fit(scores.view(), &Targets::from(vec![0, 1, 2]), None)?;
//! let probs = cal.predict_proba(scores.view())?;
//! # Ok::<(), dirichlet_calibration::calibration::errors::CalibError>(())
//! ```
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

use crate::{
    calibration::{
        core::{
            data::CalibrationData,
            options::{CalibOptions, CalibratorKind},
            preprocess::{expand_binary, log_features, validate_scores},
            structure::WeightStructure,
            targets::Targets,
        },
        errors::{CalibError, CalibResult},
        models::{
            objective::{MultinomialObjective, class_probabilities},
            regression::fit_regularization_path,
        },
    },
    optimization::loglik_optimizer::OptimOutcome,
};

/// State produced by a successful fit.
#[derive(Debug, Clone, PartialEq)]
struct FittedState {
    objective: MultinomialObjective,
    weights: Array2<f64>,
    validation_losses: Vec<f64>,
    outcome: OptimOutcome,
}

/// Dirichlet calibrator (also hosts the legacy logistic variant).
#[derive(Debug, Clone, PartialEq)]
pub struct DirichletCalibrator {
    kind: CalibratorKind,
    options: CalibOptions,
    fitted: Option<FittedState>,
}

impl DirichletCalibrator {
    /// Build an unfitted calibrator.
    pub fn new(kind: CalibratorKind, options: CalibOptions) -> Self {
        DirichletCalibrator { kind, options, fitted: None }
    }

    /// Build an unfitted calibrator from a variant name (`"full"`,
    /// `"diagonal"`, `"fixed_diagonal"`, `"logistic"`).
    ///
    /// # Errors
    /// `InvalidMatrixType` for unknown names.
    pub fn from_name(name: &str, options: CalibOptions) -> CalibResult<Self> {
        Ok(Self::new(name.parse()?, options))
    }

    pub fn kind(&self) -> CalibratorKind {
        self.kind
    }

    pub fn options(&self) -> &CalibOptions {
        &self.options
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Class count seen at fit time.
    pub fn n_classes(&self) -> Option<usize> {
        self.fitted.as_ref().map(|state| state.objective.structure().n_classes())
    }

    /// Fit the calibration map on N × k scores.
    ///
    /// ## Arguments
    /// - `scores`: N × k class scores (ideally probabilities).
    /// - `targets`: labels in `[0, k)` or an N × k indicator matrix.
    /// - `validation`: optional held-out `(scores, targets)`; required when
    ///   more than one `candidate_l2` is configured.
    ///
    /// ## Errors
    /// Input validation errors, configuration errors, or
    /// `OptimizationFailed`. On error the calibrator is left unfitted.
    pub fn fit(
        &mut self, scores: ArrayView2<f64>, targets: &Targets,
        validation: Option<(ArrayView2<f64>, &Targets)>,
    ) -> CalibResult<()> {
        self.fitted = None;
        let train = CalibrationData::new(scores, targets)?;
        let val = validation.map(|(s, t)| CalibrationData::new(s, t)).transpose()?;
        let structure = WeightStructure::new(train.n_classes(), self.kind.matrix_type())?;
        let (candidates, scope) = self.kind.penalty_plan(&self.options)?;
        let init = self.kind.weight_init(&self.options);

        let path = fit_regularization_path(
            &structure,
            scope,
            &candidates,
            &init,
            &train,
            val.as_ref(),
            &self.options.mle_opts,
        )?;
        let best = path.best;
        self.fitted = Some(FittedState {
            objective: MultinomialObjective::new(structure, best.l2, scope),
            weights: best.weights,
            validation_losses: path.validation_losses,
            outcome: best.outcome,
        });
        Ok(())
    }

    /// Fit on positive-class probabilities of a binary problem.
    pub fn fit_binary(
        &mut self, scores: ArrayView1<f64>, targets: &Targets,
        validation: Option<(ArrayView1<f64>, &Targets)>,
    ) -> CalibResult<()> {
        let expanded = expand_binary(scores);
        let expanded_val = validation.map(|(s, t)| (expand_binary(s), t));
        self.fit(expanded.view(), targets, expanded_val.as_ref().map(|(s, t)| (s.view(), *t)))
    }

    /// Calibrated probabilities, N × k; every row sums to one.
    ///
    /// # Errors
    /// `ModelNotFitted`, `ScoreShapeMismatch` if the column count differs
    /// from the fitted class count, or score validation errors.
    pub fn predict_proba(&self, scores: ArrayView2<f64>) -> CalibResult<Array2<f64>> {
        let state = self.state()?;
        let k = state.objective.structure().n_classes();
        if scores.ncols() != k {
            return Err(CalibError::ScoreShapeMismatch { expected: k, actual: scores.ncols() });
        }
        validate_scores(scores)?;
        Ok(class_probabilities(log_features(scores).view(), state.weights.view()))
    }

    /// Same output as [`predict_proba`](Self::predict_proba).
    pub fn predict(&self, scores: ArrayView2<f64>) -> CalibResult<Array2<f64>> {
        self.predict_proba(scores)
    }

    /// Calibrated positive-class probabilities for binary scores.
    ///
    /// # Errors
    /// As [`predict_proba`](Self::predict_proba); a calibrator fitted on
    /// more than two classes yields `ScoreShapeMismatch`.
    pub fn predict_proba_binary(&self, scores: ArrayView1<f64>) -> CalibResult<Array1<f64>> {
        let probs = self.predict_proba(expand_binary(scores).view())?;
        Ok(probs.column(1).to_owned())
    }

    /// Same output as [`predict_proba_binary`](Self::predict_proba_binary).
    pub fn predict_binary(&self, scores: ArrayView1<f64>) -> CalibResult<Array1<f64>> {
        self.predict_proba_binary(scores)
    }

    /// Index of the most probable calibrated class per row (first on ties).
    pub fn predict_class(&self, scores: ArrayView2<f64>) -> CalibResult<Array1<usize>> {
        let probs = self.predict_proba(scores)?;
        Ok(probs
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
                        if v > bv { (i, v) } else { (bi, bv) }
                    })
                    .0
            })
            .collect())
    }

    /// Coefficients, (k − 1) × k: the transpose of the non-bias rows of `W`.
    pub fn coef(&self) -> CalibResult<Array2<f64>> {
        let state = self.state()?;
        let k = state.objective.structure().n_classes();
        Ok(state.weights.slice(s![..k, ..]).t().to_owned())
    }

    /// Bias row of `W`, length k − 1.
    pub fn intercept(&self) -> CalibResult<Array1<f64>> {
        let state = self.state()?;
        let k = state.objective.structure().n_classes();
        Ok(state.weights.row(k).to_owned())
    }

    /// Fitted (k + 1) × (k − 1) weight matrix.
    pub fn weights(&self) -> CalibResult<ArrayView2<'_, f64>> {
        Ok(self.state()?.weights.view())
    }

    /// Penalty strength of the kept fit.
    pub fn selected_l2(&self) -> CalibResult<f64> {
        Ok(self.state()?.objective.l2())
    }

    /// Mean validation log-loss per candidate (empty without validation data).
    pub fn validation_losses(&self) -> CalibResult<&[f64]> {
        Ok(&self.state()?.validation_losses)
    }

    /// Optimizer diagnostics of the kept fit.
    pub fn outcome(&self) -> CalibResult<&OptimOutcome> {
        Ok(&self.state()?.outcome)
    }

    /// Unnormalized log-loss and penalty of the fitted weights on
    /// `(scores, targets)`.
    pub fn loss_and_penalty(
        &self, scores: ArrayView2<f64>, targets: &Targets,
    ) -> CalibResult<(f64, f64)> {
        let state = self.state()?;
        let k = state.objective.structure().n_classes();
        if scores.ncols() != k {
            return Err(CalibError::ScoreShapeMismatch { expected: k, actual: scores.ncols() });
        }
        let data = CalibrationData::new(scores, targets)?;
        Ok(state.objective.loss_and_penalty(state.weights.view(), &data))
    }

    fn state(&self) -> CalibResult<&FittedState> {
        self.fitted.as_ref().ok_or(CalibError::ModelNotFitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::core::structure::{MatrixType, identity_weights};
    use ndarray::array;

    fn toy_scores() -> (Array2<f64>, Targets) {
        let scores = array![
            [0.8, 0.1, 0.1],
            [0.6, 0.3, 0.1],
            [0.2, 0.7, 0.1],
            [0.1, 0.6, 0.3],
            [0.2, 0.2, 0.6],
            [0.1, 0.3, 0.6],
            [0.5, 0.4, 0.1],
            [0.3, 0.3, 0.4],
        ];
        (scores, Targets::from(vec![0, 0, 1, 1, 2, 2, 1, 0]))
    }

    // A light penalty keeps the tiny toy problems away from separable optima.
    fn toy_options() -> CalibOptions {
        CalibOptions { candidate_l2: vec![1e-2], seed: Some(1), ..CalibOptions::default() }
    }

    #[test]
    // Purpose
    // -------
    // Every accessor and predictor refuses to run before `fit`.
    //
    // Given
    // -----
    // - A freshly constructed calibrator.
    //
    // Expect
    // ------
    // - `ModelNotFitted` from predict_proba, coef, intercept, selected_l2.
    fn unfitted_calibrator_reports_model_not_fitted() {
        // Arrange
        let cal = DirichletCalibrator::new(MatrixType::Full.into(), CalibOptions::default());
        let (scores, _) = toy_scores();

        // Act / Assert
        assert!(!cal.is_fitted());
        assert_eq!(cal.predict_proba(scores.view()), Err(CalibError::ModelNotFitted));
        assert_eq!(cal.coef(), Err(CalibError::ModelNotFitted));
        assert_eq!(cal.intercept(), Err(CalibError::ModelNotFitted));
        assert_eq!(cal.selected_l2(), Err(CalibError::ModelNotFitted));
    }

    #[test]
    // Purpose
    // -------
    // Fitted accessors expose the documented shapes.
    //
    // Given
    // -----
    // - Full calibrator fitted on 8 samples, k = 3.
    //
    // Expect
    // ------
    // - coef 2 × 3, intercept length 2, weights 4 × 2, selected λ 1e-2,
    //   predictions 8 × 3, class labels in [0, 3).
    fn fitted_accessors_have_expected_shapes() {
        // Arrange
        let (scores, targets) = toy_scores();
        let mut cal = DirichletCalibrator::new(MatrixType::Full.into(), toy_options());

        // Act
        cal.fit(scores.view(), &targets, None).expect("fit succeeds");

        // Assert
        assert_eq!(cal.n_classes(), Some(3));
        assert_eq!(cal.coef().expect("fitted").dim(), (2, 3));
        assert_eq!(cal.intercept().expect("fitted").len(), 2);
        assert_eq!(cal.weights().expect("fitted").dim(), (4, 2));
        assert_eq!(cal.selected_l2(), Ok(1e-2));
        assert_eq!(cal.predict(scores.view()).expect("predict").dim(), (8, 3));
        assert!(cal.predict_class(scores.view()).expect("classes").iter().all(|&c| c < 3));
        assert!(cal.validation_losses().expect("fitted").is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Predicting with the wrong class count fails with a shape error.
    //
    // Given
    // -----
    // - A calibrator fitted on k = 3; scores with 4 columns and binary input.
    //
    // Expect
    // ------
    // - `ScoreShapeMismatch { expected: 3, actual: 4 }` and
    //   `{ expected: 3, actual: 2 }`.
    fn predict_rejects_wrong_class_count() {
        // Arrange
        let (scores, targets) = toy_scores();
        let mut cal = DirichletCalibrator::new(MatrixType::Diagonal.into(), toy_options());
        cal.fit(scores.view(), &targets, None).expect("fit succeeds");

        // Act / Assert
        assert_eq!(
            cal.predict_proba(Array2::from_elem((2, 4), 0.25).view()),
            Err(CalibError::ScoreShapeMismatch { expected: 3, actual: 4 })
        );
        assert_eq!(
            cal.predict_proba_binary(array![0.3, 0.6].view()),
            Err(CalibError::ScoreShapeMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Binary helpers round-trip through the two-column representation.
    //
    // Given
    // -----
    // - Positive-class scores with labels in {0, 1}, fixed-diagonal variant.
    //
    // Expect
    // ------
    // - Output length equals input length, all values in (0, 1).
    fn binary_fit_and_predict() {
        // Arrange
        let p = array![0.9, 0.8, 0.7, 0.4, 0.3, 0.2, 0.6, 0.1];
        let y = Targets::from(vec![1, 1, 0, 1, 0, 0, 1, 0]);
        let mut cal =
            DirichletCalibrator::from_name("fixed_diagonal", toy_options()).expect("known variant");

        // Act
        cal.fit_binary(p.view(), &y, None).expect("fit succeeds");
        let out = cal.predict_binary(p.view()).expect("predict");

        // Assert
        assert_eq!(out.len(), p.len());
        assert!(out.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    // Purpose
    // -------
    // A failed refit clears the previous fit.
    //
    // Given
    // -----
    // - A fitted calibrator, then a refit with mismatched targets.
    //
    // Expect
    // ------
    // - The refit errors and the calibrator reports `ModelNotFitted`.
    fn failed_refit_leaves_calibrator_unfitted() {
        // Arrange
        let (scores, targets) = toy_scores();
        let mut cal = DirichletCalibrator::new(MatrixType::Full.into(), toy_options());
        cal.fit(scores.view(), &targets, None).expect("fit succeeds");

        // Act
        let err = cal.fit(scores.view(), &Targets::from(vec![0, 1]), None);

        // Assert
        assert_eq!(err, Err(CalibError::TargetLengthMismatch { expected: 8, actual: 2 }));
        assert_eq!(cal.weights().err(), Some(CalibError::ModelNotFitted));
    }

    #[test]
    // Purpose
    // -------
    // Calibrated probabilities stay strictly inside (0, 1) for a confident,
    // unpenalized fit and for degenerate input rows.
    //
    // Given
    // -----
    // - Full variant with default options (l2 = 0) fitted on six sharp,
    //   nearly separable 3-class rows.
    // - Prediction rows that are one-hot or contain exact zeros.
    //
    // Expect
    // ------
    // - Every entry satisfies `0 < p < 1` and rows sum to one.
    fn confident_fit_keeps_probabilities_inside_open_interval() {
        // Arrange
        let scores = array![
            [0.98, 0.01, 0.01],
            [0.97, 0.02, 0.01],
            [0.01, 0.98, 0.01],
            [0.02, 0.97, 0.01],
            [0.01, 0.01, 0.98],
            [0.01, 0.02, 0.97],
        ];
        let targets = Targets::from(vec![0, 0, 1, 1, 2, 2]);
        let mut cal = DirichletCalibrator::new(MatrixType::Full.into(), CalibOptions::default());
        cal.fit(scores.view(), &targets, None).expect("fit succeeds");
        let extreme = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.5, 0.5, 0.0]];

        // Act
        let on_extreme = cal.predict_proba(extreme.view()).expect("predict");
        let on_train = cal.predict_proba(scores.view()).expect("predict");

        // Assert
        for probs in [&on_extreme, &on_train] {
            assert!(probs.iter().all(|&p| p > 0.0 && p < 1.0), "{probs:?}");
            for row in probs.rows() {
                assert!((row.sum() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // `comp_l2` leaves the diagonal, the reference row, and the bias
    // unpenalized.
    //
    // Given
    // -----
    // - Full variant, k = 3, heavy penalty λ = 5 with and without `comp_l2`.
    //
    // Expect
    // ------
    // - The comp_l2 penalty equals `λ · (W[0,1]² + W[1,0]²)`.
    // - The comp_l2 fit keeps a larger diagonal than the whole-matrix fit.
    fn comp_l2_penalizes_off_diagonal_coupling_only() {
        // Arrange
        let (scores, targets) = toy_scores();
        let whole = CalibOptions { candidate_l2: vec![5.0], ..toy_options() };
        let comp = CalibOptions { comp_l2: true, ..whole.clone() };
        let mut cal_whole = DirichletCalibrator::new(MatrixType::Full.into(), whole);
        let mut cal_comp = DirichletCalibrator::new(MatrixType::Full.into(), comp);

        // Act
        cal_whole.fit(scores.view(), &targets, None).expect("fit succeeds");
        cal_comp.fit(scores.view(), &targets, None).expect("fit succeeds");
        let w_whole = cal_whole.weights().expect("fitted");
        let w_comp = cal_comp.weights().expect("fitted");
        let (_, penalty) = cal_comp.loss_and_penalty(scores.view(), &targets).expect("fitted");

        // Assert
        let expected = 5.0 * (w_comp[[0, 1]].powi(2) + w_comp[[1, 0]].powi(2));
        assert!((penalty - expected).abs() <= 1e-12 * (1.0 + expected));
        let diag = |w: &ArrayView2<f64>| w[[0, 0]] + w[[1, 1]];
        assert!(diag(&w_comp) > diag(&w_whole), "comp {w_comp:?} vs whole {w_whole:?}");
    }

    #[test]
    // Purpose
    // -------
    // User-supplied starting weights are used by `fit` and validated against
    // the class count.
    //
    // Given
    // -----
    // - Full variant whose default start is the identity map; the same fit
    //   with `weights_init = I` passed explicitly.
    // - A 3 × 2 start for k = 3 (expected 4 × 2).
    //
    // Expect
    // ------
    // - Identical fitted weights for the default and explicit identity start.
    // - `InvalidWeightsInit { expected: (4, 2), found: (3, 2) }`, after which
    //   the calibrator is unfitted.
    fn weights_init_is_used_and_shape_checked() {
        // Arrange
        let (scores, targets) = toy_scores();
        let explicit = CalibOptions { weights_init: Some(identity_weights(3)), ..toy_options() };
        let wrong = CalibOptions { weights_init: Some(Array2::zeros((3, 2))), ..toy_options() };
        let mut cal_default = DirichletCalibrator::new(MatrixType::Full.into(), toy_options());
        let mut cal_explicit = DirichletCalibrator::new(MatrixType::Full.into(), explicit);
        let mut cal_wrong = DirichletCalibrator::new(MatrixType::Full.into(), wrong);

        // Act
        cal_default.fit(scores.view(), &targets, None).expect("fit succeeds");
        cal_explicit.fit(scores.view(), &targets, None).expect("fit succeeds");
        let err = cal_wrong.fit(scores.view(), &targets, None);

        // Assert
        assert_eq!(cal_default.weights(), cal_explicit.weights());
        assert_eq!(err, Err(CalibError::InvalidWeightsInit { expected: (4, 2), found: (3, 2) }));
        assert!(!cal_wrong.is_fitted());
    }
}
