//! Calibration targets: integer labels or (soft) indicator matrices.
//!
//! Both forms are normalized into an N × k indicator matrix `Y` whose rows
//! sum to one before they reach the objective.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::calibration::errors::{CalibError, CalibResult};

/// True outcomes supplied to `fit`.
///
/// - `Labels`: one class index in `[0, k)` per sample.
/// - `Indicator`: an N × k one-hot or soft-label matrix; rows are rescaled
///   to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets {
    Labels(Array1<usize>),
    Indicator(Array2<f64>),
}

impl Targets {
    /// Number of samples described by these targets.
    pub fn len(&self) -> usize {
        match self {
            Targets::Labels(labels) => labels.len(),
            Targets::Indicator(matrix) => matrix.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a row-normalized N × k indicator matrix.
    ///
    /// # Errors
    /// - `TargetLengthMismatch` if the sample count is not `n_samples`.
    /// - `LabelOutOfRange` for labels `>= n_classes`.
    /// - `TargetWidthMismatch` if an indicator matrix is not `n_classes` wide.
    /// - `InvalidTargetRow` for negative/non-finite entries or zero rows.
    pub fn to_indicator(&self, n_samples: usize, n_classes: usize) -> CalibResult<Array2<f64>> {
        if self.len() != n_samples {
            return Err(CalibError::TargetLengthMismatch {
                expected: n_samples,
                actual: self.len(),
            });
        }
        match self {
            Targets::Labels(labels) => one_hot(labels.view(), n_classes),
            Targets::Indicator(matrix) => normalize_indicator(matrix, n_classes),
        }
    }
}

impl From<Vec<usize>> for Targets {
    fn from(labels: Vec<usize>) -> Self {
        Targets::Labels(Array1::from(labels))
    }
}

impl From<Array1<usize>> for Targets {
    fn from(labels: Array1<usize>) -> Self {
        Targets::Labels(labels)
    }
}

impl From<Array2<f64>> for Targets {
    fn from(matrix: Array2<f64>) -> Self {
        Targets::Indicator(matrix)
    }
}

/// One-hot encode `labels` into an N × `n_classes` matrix.
///
/// # Errors
/// `LabelOutOfRange` for the first label `>= n_classes`.
pub fn one_hot(labels: ArrayView1<usize>, n_classes: usize) -> CalibResult<Array2<f64>> {
    let mut out = Array2::zeros((labels.len(), n_classes));
    for (index, &label) in labels.iter().enumerate() {
        if label >= n_classes {
            return Err(CalibError::LabelOutOfRange { index, label, n_classes });
        }
        out[[index, label]] = 1.0;
    }
    Ok(out)
}

/// Reject targets in which fewer than two classes carry any mass.
///
/// # Errors
/// `DegenerateLabels` with the number of classes present.
pub fn ensure_multiple_classes(indicator: ArrayView2<f64>) -> CalibResult<()> {
    let distinct = indicator.sum_axis(Axis(0)).iter().filter(|&&mass| mass > 0.0).count();
    if distinct < 2 {
        return Err(CalibError::DegenerateLabels { distinct });
    }
    Ok(())
}

fn normalize_indicator(matrix: &Array2<f64>, n_classes: usize) -> CalibResult<Array2<f64>> {
    if matrix.ncols() != n_classes {
        return Err(CalibError::TargetWidthMismatch {
            expected: n_classes,
            actual: matrix.ncols(),
        });
    }
    let mut out = matrix.to_owned();
    for (row, mut values) in out.axis_iter_mut(Axis(0)).enumerate() {
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(CalibError::InvalidTargetRow {
                row,
                reason: "entries must be finite and non-negative",
            });
        }
        let total = values.sum();
        if total <= 0.0 {
            return Err(CalibError::InvalidTargetRow { row, reason: "row must have positive mass" });
        }
        values.mapv_inplace(|v| v / total);
    }
    Ok(out)
}
