//! Calibration options — configuration for fitting a calibration map.
//!
//! Purpose
//! -------
//! Collect the knobs for one calibration fit in one place: which calibrator
//! variant to fit, the regularization candidates, how the penalty is scoped,
//! where the optimizer starts, and how the L-BFGS backend is tuned.
//!
//! Key behaviors
//! -------------
//! - [`CalibratorKind`] tags the variant (Dirichlet with a [`MatrixType`], or
//!   the legacy logistic-regression calibrator with inverse regularization
//!   `C`).
//! - [`CalibOptions`] bundles `candidate_l2`, `comp_l2`, `weights_init`,
//!   `seed`, and [`MLEOptions`], validated once in [`CalibOptions::new`].
//! - [`CalibratorKind::penalty_plan`] resolves kind + options into the
//!   concrete list of penalty strengths and the [`PenaltyScope`] they act on.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every `candidate_l2` entry is finite and `>= 0`; the list is non-empty.
//! - `C` for the logistic variant is finite and `> 0`.
//! - `weights_init` is checked against the class count at fit time, since
//!   `k` is only known once scores arrive.
//!
//! Conventions
//! -----------
//! - `candidate_l2` is the input list; the chosen value is reported by the
//!   fitted calibrator as `selected_l2`. The two are never the same field.
use std::str::FromStr;

use ndarray::Array2;

use crate::{
    calibration::{
        core::structure::{MatrixType, PenaltyScope, WeightInit},
        errors::{CalibError, CalibResult},
    },
    optimization::loglik_optimizer::MLEOptions,
};

/// Default inverse regularization of the logistic variant (practically
/// unpenalized).
pub const DEFAULT_LOGISTIC_C: f64 = 1e11;

/// Calibrator variant.
///
/// - `Dirichlet(matrix_type)`: Dirichlet calibration with the given weight
///   structure and the `candidate_l2` penalty.
/// - `Logistic { c }`: multinomial logistic regression on log-probabilities
///   with a full weight matrix and penalty `1/(2C)` on the coefficients only
///   (intercept unpenalized). `candidate_l2` and `comp_l2` are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibratorKind {
    Dirichlet(MatrixType),
    Logistic { c: f64 },
}

impl CalibratorKind {
    /// Logistic variant with a validated inverse regularization.
    ///
    /// # Errors
    /// `InvalidInverseRegularization` unless `c` is finite and `> 0`.
    pub fn logistic(c: f64) -> CalibResult<Self> {
        validate_inverse_regularization(c)?;
        Ok(CalibratorKind::Logistic { c })
    }

    /// Weight structure fitted by this variant.
    pub fn matrix_type(&self) -> MatrixType {
        match self {
            CalibratorKind::Dirichlet(matrix_type) => *matrix_type,
            CalibratorKind::Logistic { .. } => MatrixType::Full,
        }
    }

    /// Resolve the penalty strengths to try and the entries they act on.
    ///
    /// # Errors
    /// `InvalidInverseRegularization` for a logistic kind built by hand with
    /// an invalid `c`.
    pub fn penalty_plan(&self, opts: &CalibOptions) -> CalibResult<(Vec<f64>, PenaltyScope)> {
        match self {
            CalibratorKind::Dirichlet(_) => {
                let scope = if opts.comp_l2 { PenaltyScope::OffDiagonal } else { PenaltyScope::All };
                Ok((opts.candidate_l2.clone(), scope))
            }
            CalibratorKind::Logistic { c } => {
                validate_inverse_regularization(*c)?;
                Ok((vec![1.0 / (2.0 * c)], PenaltyScope::Coefficients))
            }
        }
    }

    /// Starting-point policy: user weights if given, else the identity map
    /// for full matrices and a seeded random start for the constrained
    /// variants.
    pub fn weight_init(&self, opts: &CalibOptions) -> WeightInit {
        match (&opts.weights_init, self.matrix_type()) {
            (Some(weights), _) => WeightInit::Given(weights.clone()),
            (None, MatrixType::Full) => WeightInit::Identity,
            (None, _) => WeightInit::Random { seed: opts.seed },
        }
    }
}

impl From<MatrixType> for CalibratorKind {
    fn from(matrix_type: MatrixType) -> Self {
        CalibratorKind::Dirichlet(matrix_type)
    }
}

impl FromStr for CalibratorKind {
    type Err = CalibError;

    /// Parse a matrix type name, or `"logistic"` for the logistic variant
    /// with [`DEFAULT_LOGISTIC_C`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("logistic") {
            return Ok(CalibratorKind::Logistic { c: DEFAULT_LOGISTIC_C });
        }
        s.parse::<MatrixType>().map(CalibratorKind::Dirichlet)
    }
}

/// CalibOptions — fit-time configuration for a calibrator.
///
/// Fields
/// ------
/// - `candidate_l2`: penalty strengths to try. One value means one fit; more
///   than one requires a validation set and the value with the lowest mean
///   validation log-loss wins (first minimum on ties).
/// - `comp_l2`: restrict the penalty to off-diagonal coupling entries
///   instead of the whole matrix.
/// - `weights_init`: optional (k + 1) × (k − 1) starting matrix.
/// - `seed`: RNG seed for the random start of the constrained variants;
///   `None` draws from system entropy.
/// - `mle_opts`: L-BFGS settings.
///
/// Default
/// -------
/// `candidate_l2 = [0.0]`, `comp_l2 = false`, no initial weights, no seed,
/// `MLEOptions::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibOptions {
    pub candidate_l2: Vec<f64>,
    pub comp_l2: bool,
    pub weights_init: Option<Array2<f64>>,
    pub seed: Option<u64>,
    pub mle_opts: MLEOptions,
}

impl CalibOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - `EmptyL2Candidates` if `candidate_l2` is empty.
    /// - `InvalidL2` for a negative or non-finite candidate.
    pub fn new(
        candidate_l2: Vec<f64>, comp_l2: bool, weights_init: Option<Array2<f64>>,
        seed: Option<u64>, mle_opts: MLEOptions,
    ) -> CalibResult<Self> {
        validate_candidates(&candidate_l2)?;
        Ok(Self { candidate_l2, comp_l2, weights_init, seed, mle_opts })
    }
}

impl Default for CalibOptions {
    fn default() -> Self {
        Self {
            candidate_l2: vec![0.0],
            comp_l2: false,
            weights_init: None,
            seed: None,
            mle_opts: MLEOptions::default(),
        }
    }
}

/// Check a list of penalty strengths.
///
/// # Errors
/// `EmptyL2Candidates` or `InvalidL2` for the first bad entry.
pub fn validate_candidates(candidates: &[f64]) -> CalibResult<()> {
    if candidates.is_empty() {
        return Err(CalibError::EmptyL2Candidates);
    }
    for &value in candidates {
        if !value.is_finite() {
            return Err(CalibError::InvalidL2 { value, reason: "must be finite" });
        }
        if value < 0.0 {
            return Err(CalibError::InvalidL2 { value, reason: "must be non-negative" });
        }
    }
    Ok(())
}

fn validate_inverse_regularization(c: f64) -> CalibResult<()> {
    if !c.is_finite() || c <= 0.0 {
        return Err(CalibError::InvalidInverseRegularization { value: c });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // `CalibOptions::new` rejects empty, negative, and non-finite candidates.
    //
    // Given
    // -----
    // - `[]`, `[0.1, -1.0]`, `[NaN]`, and a valid `[0.0, 1e-3]`.
    //
    // Expect
    // ------
    // - `EmptyL2Candidates`, `InvalidL2 { value: -1.0 }`, `InvalidL2`, `Ok`.
    fn calib_options_validate_candidates() {
        // Act / Assert
        let mk = |c: Vec<f64>| CalibOptions::new(c, false, None, None, MLEOptions::default());
        assert_eq!(mk(vec![]), Err(CalibError::EmptyL2Candidates));
        assert!(matches!(mk(vec![0.1, -1.0]), Err(CalibError::InvalidL2 { value, .. }) if value == -1.0));
        assert!(matches!(mk(vec![f64::NAN]), Err(CalibError::InvalidL2 { .. })));
        assert!(mk(vec![0.0, 1e-3]).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The logistic variant maps `C` to a coefficient-only penalty.
    //
    // Given
    // -----
    // - `C = 0.5` with default options carrying other candidates.
    //
    // Expect
    // ------
    // - Penalty plan `([1.0], Coefficients)`; invalid `C` is rejected.
    fn logistic_penalty_plan_uses_inverse_regularization() {
        // Arrange
        let kind = CalibratorKind::logistic(0.5).expect("valid C");
        let opts = CalibOptions { candidate_l2: vec![3.0, 4.0], ..CalibOptions::default() };

        // Act
        let (l2, scope) = kind.penalty_plan(&opts).expect("valid plan");

        // Assert
        assert_eq!(l2, vec![1.0]);
        assert_eq!(scope, PenaltyScope::Coefficients);
        assert_eq!(
            CalibratorKind::logistic(0.0),
            Err(CalibError::InvalidInverseRegularization { value: 0.0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Starting points follow the variant unless weights are supplied.
    //
    // Given
    // -----
    // - Full and diagonal kinds with a seed; then explicit weights.
    //
    // Expect
    // ------
    // - Identity, seeded Random, then Given.
    fn weight_init_policy_depends_on_variant() {
        // Arrange
        let opts = CalibOptions { seed: Some(3), ..CalibOptions::default() };
        let given = CalibOptions { weights_init: Some(Array2::zeros((3, 1))), ..opts.clone() };

        // Act / Assert
        assert_eq!(CalibratorKind::from(MatrixType::Full).weight_init(&opts), WeightInit::Identity);
        assert_eq!(
            CalibratorKind::from(MatrixType::Diagonal).weight_init(&opts),
            WeightInit::Random { seed: Some(3) }
        );
        assert!(matches!(
            CalibratorKind::from(MatrixType::FixedDiagonal).weight_init(&given),
            WeightInit::Given(_)
        ));
        assert_eq!(
            "Logistic".parse::<CalibratorKind>(),
            Ok(CalibratorKind::Logistic { c: DEFAULT_LOGISTIC_C })
        );
        assert_eq!(
            "comp".parse::<CalibratorKind>(),
            Err(CalibError::InvalidMatrixType { name: "comp".to_string() })
        );
    }

    #[test]
    // Purpose
    // -------
    // `comp_l2` switches every Dirichlet variant to the off-diagonal scope
    // and leaves the candidate list untouched; the logistic variant ignores it.
    //
    // Given
    // -----
    // - Candidates `[0.0, 1e-2]` with `comp_l2` false and true.
    //
    // Expect
    // ------
    // - `All` without comp_l2, `OffDiagonal` with it, `Coefficients` for
    //   logistic either way.
    fn comp_l2_selects_off_diagonal_scope() {
        // Arrange
        let plain = CalibOptions { candidate_l2: vec![0.0, 1e-2], ..CalibOptions::default() };
        let comp = CalibOptions { comp_l2: true, ..plain.clone() };

        // Act / Assert
        for matrix_type in [MatrixType::Full, MatrixType::Diagonal, MatrixType::FixedDiagonal] {
            let kind = CalibratorKind::from(matrix_type);
            assert_eq!(kind.penalty_plan(&plain), Ok((vec![0.0, 1e-2], PenaltyScope::All)));
            assert_eq!(kind.penalty_plan(&comp), Ok((vec![0.0, 1e-2], PenaltyScope::OffDiagonal)));
        }
        let logistic = CalibratorKind::logistic(1.0).expect("valid C");
        assert_eq!(logistic.penalty_plan(&comp), Ok((vec![0.5], PenaltyScope::Coefficients)));
    }
}
