//! Log-loss scoring used for λ selection and diagnostics.
use ndarray::{ArrayView2, Axis};

use crate::optimization::numerical_stability::{LOG_LOSS_EPS, clip_probability};

/// Multinomial log-loss `−Σ_n Σ_j Y_nj ln P_nj`.
///
/// Probabilities are clipped to `[1e-15, 1 − 1e-15]` and each row is
/// renormalized before scoring. With `normalize = true` the sum is divided
/// by the number of samples.
///
/// Shapes of `indicator` and `probs` must match; both are N × k.
pub fn log_loss(indicator: ArrayView2<f64>, probs: ArrayView2<f64>, normalize: bool) -> f64 {
    let mut total = 0.0;
    for (y, p) in indicator.axis_iter(Axis(0)).zip(probs.axis_iter(Axis(0))) {
        let clipped = p.mapv(|v| clip_probability(v, LOG_LOSS_EPS));
        let mass = clipped.sum();
        total -= y.iter().zip(clipped.iter()).map(|(&t, &q)| t * (q / mass).ln()).sum::<f64>();
    }
    if normalize && indicator.nrows() > 0 { total / indicator.nrows() as f64 } else { total }
}
