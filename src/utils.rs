//! Python conversion helpers for the `python-bindings` feature.
//!
//! Every helper turns loosely typed Python input (NumPy arrays, pandas
//! objects, nested sequences) into the validated Rust types used by
//! `calibration`, and maps failures to `ValueError`/`TypeError`.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{
        core::{options::CalibOptions, targets::Targets},
        errors::CalibError,
    },
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
};

/// Scores passed from Python: a 2-D matrix or a 1-D vector of
/// positive-class probabilities.
#[cfg(feature = "python-bindings")]
pub enum PyScores {
    Matrix(Array2<f64>),
    Binary(Array1<f64>),
}

/// Extract scores as `float64`, accepting NumPy arrays, objects with
/// `to_numpy()`, and nested sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_scores<'py>(raw: &Bound<'py, PyAny>) -> PyResult<PyScores> {
    let obj = match raw.call_method("to_numpy", (), None) {
        Ok(converted) => converted,
        Err(_) => raw.clone(),
    };
    if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
        return Ok(PyScores::Matrix(arr.as_array().to_owned()));
    }
    if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
        return Ok(PyScores::Binary(arr.as_array().to_owned()));
    }
    if let Ok(rows) = obj.extract::<Vec<Vec<f64>>>() {
        return rows_to_matrix(rows).map(PyScores::Matrix);
    }
    let vec: Vec<f64> = obj.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a 1-D or 2-D numpy.ndarray, pandas object, or sequence of float64",
        )
    })?;
    Ok(PyScores::Binary(Array1::from(vec)))
}

/// Extract targets: integer labels (1-D) or an indicator matrix (2-D).
#[cfg(feature = "python-bindings")]
pub fn extract_targets<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Targets> {
    let obj = match raw.call_method("to_numpy", (), None) {
        Ok(converted) => converted,
        Err(_) => raw.clone(),
    };
    if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
        return Ok(Targets::Indicator(arr.as_array().to_owned()));
    }
    if let Ok(labels) = obj.extract::<Vec<i64>>() {
        let labels = labels
            .into_iter()
            .map(|label| {
                usize::try_from(label)
                    .map_err(|_| PyValueError::new_err(format!("label {label} must be >= 0")))
            })
            .collect::<PyResult<Vec<usize>>>()?;
        return Ok(Targets::from(labels));
    }
    if let Ok(rows) = obj.extract::<Vec<Vec<f64>>>() {
        return rows_to_matrix(rows).map(Targets::Indicator);
    }
    Err(PyTypeError::new_err("expected integer labels or a 2-D indicator matrix"))
}

/// Accept either a single float or a sequence of floats as l2 candidates.
#[cfg(feature = "python-bindings")]
pub fn extract_l2<'py>(raw: Option<&Bound<'py, PyAny>>) -> PyResult<Vec<f64>> {
    match raw {
        None => Ok(vec![0.0]),
        Some(obj) => {
            if let Ok(value) = obj.extract::<f64>() {
                return Ok(vec![value]);
            }
            obj.extract::<Vec<f64>>()
                .map_err(|_| PyTypeError::new_err("l2 must be a float or a sequence of floats"))
        }
    }
}

/// Build validated [`CalibOptions`] from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_calib_options<'py>(
    l2: Option<&Bound<'py, PyAny>>, comp_l2: bool, weights_init: Option<&Bound<'py, PyAny>>,
    seed: Option<u64>, tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<CalibOptions> {
    let candidates = extract_l2(l2)?;
    let weights_init = match weights_init {
        Some(raw) => match extract_scores(raw)? {
            PyScores::Matrix(weights) => Some(weights),
            PyScores::Binary(_) => {
                return Err(PyValueError::new_err("weights_init must be a 2-D matrix"));
            }
        },
        None => None,
    };
    let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
    Ok(CalibOptions::new(candidates, comp_l2, weights_init, seed, mle_opts)?)
}

#[cfg(feature = "python-bindings")]
fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() && line_searcher.is_none()
        && lbfgs_mem.is_none()
    {
        return Ok(MLEOptions::default());
    }
    let defaults = MLEOptions::default().tols;
    let tols = Tolerances::new(
        tol_grad.or(defaults.tol_grad),
        tol_cost,
        max_iter.or(defaults.max_iter),
    )
    .map_err(CalibError::from)?;
    let ls = match line_searcher {
        Some(name) => name.parse::<LineSearcher>().map_err(CalibError::from)?,
        None => LineSearcher::MoreThuente,
    };
    Ok(MLEOptions::new(tols, ls, false, lbfgs_mem).map_err(CalibError::from)?)
}

#[cfg(feature = "python-bindings")]
fn rows_to_matrix(rows: Vec<Vec<f64>>) -> PyResult<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    Array2::from_shape_vec((n_rows, n_cols), rows.into_iter().flatten().collect())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}
