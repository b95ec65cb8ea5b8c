//! Weight-matrix structure: matrix types, per-entry bounds, and the mapping
//! between unconstrained optimizer parameters `θ` and the calibration
//! weights `W`.
//!
//! Layout
//! ------
//! `W` has shape (k + 1) × (k − 1). Row `i < k` holds the coefficients of
//! `ln p_i`, row `k` is the bias. Column `j` produces the logit of class
//! `j`; class `k − 1` is the reference class whose logit is identically 0,
//! so row `k − 1` is the reference-class row.
//!
//! Entries are addressed row-major (`index = row · (k − 1) + col`), matching
//! `W.iter()`.
//!
//! Parameterization
//! ----------------
//! Every non-fixed entry is driven by exactly one free parameter:
//! `W[e] = sign_e · T_p(θ_p)` where `T_p` is the identity, `softplus`, or
//! `−softplus` depending on the parameter's [`Bound`]. Fixed entries have no
//! parameter and stay exactly 0. Several entries may share one parameter
//! (the fixed-diagonal tie).
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use crate::{
    calibration::errors::{CalibError, CalibResult},
    optimization::{
        loglik_optimizer::{Grad, Theta},
        numerical_stability::{SOFTPLUS_FLOOR, safe_logistic, safe_softplus, safe_softplus_inv},
    },
};

/// Structural constraint on the calibration weights.
///
/// - `Full`: every entry free.
/// - `Diagonal`: per-class scale `W[j, j] ≥ 0`, reference row `≤ 0`, free
///   bias, all cross-class coupling fixed at 0.
/// - `FixedDiagonal`: a single shared scale `s ≥ 0` on the diagonal, `−s`
///   on the reference row, free bias (temperature scaling with class
///   offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixType {
    Full,
    Diagonal,
    FixedDiagonal,
}

impl FromStr for MatrixType {
    type Err = CalibError;

    /// Parse `"full"`, `"diagonal"`, `"fixed_diagonal"` (or `"fixed_diag"`),
    /// case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(MatrixType::Full),
            "diagonal" | "diag" => Ok(MatrixType::Diagonal),
            "fixed_diagonal" | "fixed_diag" => Ok(MatrixType::FixedDiagonal),
            _ => Err(CalibError::InvalidMatrixType { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for MatrixType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixType::Full => write!(f, "full"),
            MatrixType::Diagonal => write!(f, "diagonal"),
            MatrixType::FixedDiagonal => write!(f, "fixed_diagonal"),
        }
    }
}

/// Admissible interval for a weight entry or a free parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// (−∞, ∞)
    Free,
    /// [0, ∞)
    NonNegative,
    /// (−∞, 0]
    NonPositive,
    /// Exactly 0.
    Fixed,
}

impl Bound {
    /// Map an unconstrained value into the bound.
    pub fn apply(self, theta: f64) -> f64 {
        match self {
            Bound::Free => theta,
            Bound::NonNegative => safe_softplus(theta),
            Bound::NonPositive => -safe_softplus(theta),
            Bound::Fixed => 0.0,
        }
    }

    /// Derivative of [`Bound::apply`] with respect to `theta`.
    pub fn derivative(self, theta: f64) -> f64 {
        match self {
            Bound::Free => 1.0,
            Bound::NonNegative => safe_logistic(theta),
            Bound::NonPositive => -safe_logistic(theta),
            Bound::Fixed => 0.0,
        }
    }

    /// Inverse of [`Bound::apply`]; values on or outside the boundary are
    /// pulled to magnitude [`SOFTPLUS_FLOOR`].
    pub fn encode(self, value: f64) -> f64 {
        match self {
            Bound::Free => value,
            Bound::NonNegative => safe_softplus_inv(value.max(SOFTPLUS_FLOOR)),
            Bound::NonPositive => safe_softplus_inv((-value).max(SOFTPLUS_FLOOR)),
            Bound::Fixed => 0.0,
        }
    }

    /// Whether `value` lies in the bound (up to `tol`).
    pub fn contains(self, value: f64, tol: f64) -> bool {
        match self {
            Bound::Free => value.is_finite(),
            Bound::NonNegative => value >= -tol,
            Bound::NonPositive => value <= tol,
            Bound::Fixed => value == 0.0,
        }
    }

    fn flipped(self) -> Bound {
        match self {
            Bound::NonNegative => Bound::NonPositive,
            Bound::NonPositive => Bound::NonNegative,
            other => other,
        }
    }
}

/// Which weight entries the L2 penalty acts on.
///
/// - `All`: every entry of `W`, bias included.
/// - `OffDiagonal`: only cross-class coupling, i.e. coefficient entries that
///   are zero in the identity map (not `W[j, j]`, not the reference row, not
///   the bias).
/// - `Coefficients`: every non-bias entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyScope {
    All,
    OffDiagonal,
    Coefficients,
}

/// Link from one weight entry to the free parameter driving it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Link {
    param: usize,
    sign: f64,
}

/// Structure of the weight matrix for a class count and matrix type.
///
/// Built once per fit and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightStructure {
    n_classes: usize,
    matrix_type: MatrixType,
    links: Vec<Option<Link>>,
    param_bounds: Vec<Bound>,
}

impl WeightStructure {
    /// Build the structure for `n_classes` classes.
    ///
    /// # Errors
    /// `TooFewClasses` if `n_classes < 2`.
    pub fn new(n_classes: usize, matrix_type: MatrixType) -> CalibResult<Self> {
        if n_classes < 2 {
            return Err(CalibError::TooFewClasses { n_classes });
        }
        let k = n_classes;
        let cols = k - 1;
        let mut links = vec![None; (k + 1) * cols];
        let mut param_bounds = Vec::new();
        let mut add_param = |bound: Bound| {
            param_bounds.push(bound);
            param_bounds.len() - 1
        };

        match matrix_type {
            MatrixType::Full => {
                for link in links.iter_mut() {
                    *link = Some(Link { param: add_param(Bound::Free), sign: 1.0 });
                }
            }
            MatrixType::Diagonal => {
                for j in 0..cols {
                    links[j * cols + j] =
                        Some(Link { param: add_param(Bound::NonNegative), sign: 1.0 });
                }
                for j in 0..cols {
                    links[(k - 1) * cols + j] =
                        Some(Link { param: add_param(Bound::NonPositive), sign: 1.0 });
                }
                for j in 0..cols {
                    links[k * cols + j] = Some(Link { param: add_param(Bound::Free), sign: 1.0 });
                }
            }
            MatrixType::FixedDiagonal => {
                let scale = add_param(Bound::NonNegative);
                for j in 0..cols {
                    links[j * cols + j] = Some(Link { param: scale, sign: 1.0 });
                    links[(k - 1) * cols + j] = Some(Link { param: scale, sign: -1.0 });
                }
                for j in 0..cols {
                    links[k * cols + j] = Some(Link { param: add_param(Bound::Free), sign: 1.0 });
                }
            }
        }

        Ok(WeightStructure { n_classes, matrix_type, links, param_bounds })
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn matrix_type(&self) -> MatrixType {
        self.matrix_type
    }

    /// Shape of `W`: (k + 1) × (k − 1).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_classes + 1, self.n_classes - 1)
    }

    /// Number of free optimizer parameters.
    pub fn n_params(&self) -> usize {
        self.param_bounds.len()
    }

    /// Per-entry bounds of the raveled (row-major) weight matrix.
    pub fn bounds(&self) -> Vec<Bound> {
        self.links
            .iter()
            .map(|link| match link {
                None => Bound::Fixed,
                Some(Link { param, sign }) if *sign < 0.0 => self.param_bounds[*param].flipped(),
                Some(Link { param, .. }) => self.param_bounds[*param],
            })
            .collect()
    }

    /// Parameter index driving each raveled entry (`None` when fixed).
    /// Entries sharing an index are tied.
    pub fn parameter_map(&self) -> Vec<Option<usize>> {
        self.links.iter().map(|link| link.map(|l| l.param)).collect()
    }

    /// Expand `θ` into the weight matrix `W`.
    ///
    /// # Panics
    /// If `theta.len() != self.n_params()`; callers validate the length
    /// once up front, so a mismatch here is a solver bug.
    pub fn expand(&self, theta: ArrayView1<f64>) -> Array2<f64> {
        assert_eq!(theta.len(), self.n_params(), "theta length does not match weight structure");
        let values: Vec<f64> = self
            .links
            .iter()
            .map(|link| match link {
                None => 0.0,
                Some(Link { param, sign }) => sign * self.param_bounds[*param].apply(theta[*param]),
            })
            .collect();
        Array2::from_shape_vec(self.shape(), values)
            .unwrap_or_else(|_| unreachable!("links cover the full weight matrix"))
    }

    /// Pull a gradient with respect to `W` back to `θ`:
    /// `∂L/∂θ_p = Σ_{e→p} sign_e · ∂L/∂W_e · T_p′(θ_p)`.
    pub fn pull_back(&self, grad_w: &Array2<f64>, theta: ArrayView1<f64>) -> Grad {
        let mut grad = Array1::zeros(self.n_params());
        for (link, &g) in self.links.iter().zip(grad_w.iter()) {
            if let Some(Link { param, sign }) = link {
                grad[*param] += sign * g;
            }
        }
        for (p, bound) in self.param_bounds.iter().enumerate() {
            grad[p] *= bound.derivative(theta[p]);
        }
        grad
    }

    /// Encode a weight matrix into `θ`: tied entries are averaged (after
    /// undoing their sign) and mapped through the inverse transform.
    /// Entries the structure pins at 0 are ignored.
    ///
    /// # Errors
    /// `InvalidWeightsInit` if `weights` does not have shape (k + 1) × (k − 1).
    pub fn encode(&self, weights: &Array2<f64>) -> CalibResult<Theta> {
        if weights.dim() != self.shape() {
            return Err(CalibError::InvalidWeightsInit {
                expected: self.shape(),
                found: weights.dim(),
            });
        }
        let mut sums = vec![0.0; self.n_params()];
        let mut counts = vec![0usize; self.n_params()];
        for (link, &w) in self.links.iter().zip(weights.iter()) {
            if let Some(Link { param, sign }) = link {
                sums[*param] += sign * w;
                counts[*param] += 1;
            }
        }
        Ok(Array1::from_iter(self.param_bounds.iter().enumerate().map(|(p, bound)| {
            let mean = sums[p] / counts[p].max(1) as f64;
            bound.encode(mean)
        })))
    }

    /// Mask with 1.0 on entries penalized under `scope`, 0.0 elsewhere.
    pub fn penalty_mask(&self, scope: PenaltyScope) -> Array2<f64> {
        let k = self.n_classes;
        Array2::from_shape_fn(self.shape(), |(row, col)| {
            let is_bias = row == k;
            let is_identity_entry = row == col || row == k - 1;
            let penalized = match scope {
                PenaltyScope::All => true,
                PenaltyScope::Coefficients => !is_bias,
                PenaltyScope::OffDiagonal => !is_bias && !is_identity_entry,
            };
            if penalized { 1.0 } else { 0.0 }
        })
    }
}

/// Weights reproducing the input probabilities: `W[j, j] = 1`, reference
/// row `−1`, bias 0, so `softmax(X′W, 0) = p / Σp`.
pub fn identity_weights(n_classes: usize) -> Array2<f64> {
    let k = n_classes;
    let mut weights = Array2::zeros((k + 1, k - 1));
    for j in 0..k - 1 {
        weights[[j, j]] = 1.0;
        weights[[k - 1, j]] = -1.0;
    }
    weights
}

/// Random starting weights: diagonal ~ U(0, 1), reference row ~ −U(0, 1),
/// bias ~ N(0, 1), everything else 0.
pub fn random_weights<R: Rng + ?Sized>(n_classes: usize, rng: &mut R) -> Array2<f64> {
    let k = n_classes;
    let mut weights = Array2::zeros((k + 1, k - 1));
    for j in 0..k - 1 {
        weights[[j, j]] = rng.gen::<f64>();
    }
    for j in 0..k - 1 {
        weights[[k - 1, j]] = -rng.gen::<f64>();
    }
    for j in 0..k - 1 {
        weights[[k, j]] = rng.sample::<f64, _>(StandardNormal);
    }
    weights
}

/// Starting point policy.
///
/// - `Identity`: [`identity_weights`].
/// - `Random { seed }`: [`random_weights`] from `StdRng`; `None` seeds from
///   system entropy.
/// - `Given(W)`: user-supplied weights, projected onto the structure.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightInit {
    Identity,
    Random { seed: Option<u64> },
    Given(Array2<f64>),
}

impl WeightInit {
    /// Materialize the initial weight matrix for `n_classes` classes.
    pub fn weights(&self, n_classes: usize) -> Array2<f64> {
        match self {
            WeightInit::Identity => identity_weights(n_classes),
            WeightInit::Random { seed } => {
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(*s),
                    None => StdRng::from_entropy(),
                };
                random_weights(n_classes, &mut rng)
            }
            WeightInit::Given(weights) => weights.clone(),
        }
    }
}
