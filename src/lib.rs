//! dirichlet_calibration — Dirichlet calibration of classifier probabilities,
//! with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the calibrator to Python via the `_dirichlet_calibration`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing class and the module initializer.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`calibration` and `optimization`) as
//!   the public crate surface.
//! - Define the `#[pyclass]` wrapper and the `#[pymodule]` initializer for
//!   the `_dirichlet_calibration` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - The Python class mirrors the sklearn-style surface of
//!   [`calibration::models::DirichletCalibrator`].
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are propagated as rich error types
//!   internally and converted to `PyErr` values at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on `calibration` directly and can ignore
//!   the items guarded by the `python-bindings` feature.

pub mod calibration;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{
        core::{options::CalibratorKind, preprocess::expand_binary},
        models::DirichletCalibrator,
    },
    utils::{PyScores, build_calib_options, extract_scores, extract_targets},
};

/// DirichletCalibrator — Python-facing wrapper for the calibrator.
///
/// Constructed from Python via
/// `DirichletCalibrator(matrix_type="full", l2=0.0, comp_l2=False, ...)`.
/// `matrix_type` is one of `"full"`, `"diagonal"`, `"fixed_diagonal"`, or
/// `"logistic"`; `l2` is a float or a list of candidates. Scores passed to
/// `fit`/`predict_proba` may be N × k matrices or 1-D positive-class
/// probabilities for binary problems.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "DirichletCalibrator", module = "dirichlet_calibration", unsendable)]
pub struct PyDirichletCalibrator {
    inner: DirichletCalibrator,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyDirichletCalibrator {
    #[new]
    #[pyo3(
        signature = (
            matrix_type = "full",
            l2 = None,
            comp_l2 = false,
            weights_init = None,
            seed = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
        ),
        text_signature = "(matrix_type='full', l2=None, comp_l2=False, weights_init=None, \
                          seed=None, tol_grad=None, tol_cost=None, max_iter=None, \
                          line_searcher=None, lbfgs_mem=None)"
    )]
    pub fn new<'py>(
        matrix_type: &str, l2: Option<&Bound<'py, PyAny>>, comp_l2: bool,
        weights_init: Option<&Bound<'py, PyAny>>, seed: Option<u64>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>,
    ) -> PyResult<Self> {
        let kind: CalibratorKind = matrix_type.parse()?;
        let options = build_calib_options(
            l2,
            comp_l2,
            weights_init,
            seed,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
        )?;
        Ok(PyDirichletCalibrator { inner: DirichletCalibrator::new(kind, options) })
    }

    /// Fit on scores and targets; `x_val`/`y_val` select among several l2
    /// candidates.
    #[pyo3(signature = (scores, y, x_val = None, y_val = None))]
    pub fn fit<'py>(
        &mut self, scores: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        x_val: Option<&Bound<'py, PyAny>>, y_val: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<()> {
        let targets = extract_targets(y)?;
        let validation = match (x_val, y_val) {
            (Some(x), Some(t)) => Some((extract_scores(x)?, extract_targets(t)?)),
            (None, None) => None,
            _ => {
                return Err(PyValueError::new_err("x_val and y_val must be given together"));
            }
        };
        match extract_scores(scores)? {
            PyScores::Matrix(s) => {
                let val = match &validation {
                    Some((PyScores::Matrix(vs), vt)) => Some((vs.view(), vt)),
                    Some((PyScores::Binary(_), _)) => {
                        return Err(PyValueError::new_err("x_val must have the same layout as scores"));
                    }
                    None => None,
                };
                self.inner.fit(s.view(), &targets, val)?;
            }
            PyScores::Binary(p) => {
                let val = match &validation {
                    Some((PyScores::Binary(vp), vt)) => Some((vp.view(), vt)),
                    Some((PyScores::Matrix(_), _)) => {
                        return Err(PyValueError::new_err("x_val must have the same layout as scores"));
                    }
                    None => None,
                };
                self.inner.fit_binary(p.view(), &targets, val)?;
            }
        }
        Ok(())
    }

    /// Calibrated probabilities: N × k for matrix input, length N for
    /// binary input.
    pub fn predict_proba<'py>(
        &self, py: Python<'py>, scores: &Bound<'py, PyAny>,
    ) -> PyResult<PyObject> {
        Ok(match extract_scores(scores)? {
            PyScores::Matrix(s) => {
                self.inner.predict_proba(s.view())?.into_pyarray(py).into_any().unbind()
            }
            PyScores::Binary(p) => {
                self.inner.predict_proba_binary(p.view())?.into_pyarray(py).into_any().unbind()
            }
        })
    }

    /// Alias of `predict_proba`.
    pub fn predict<'py>(&self, py: Python<'py>, scores: &Bound<'py, PyAny>) -> PyResult<PyObject> {
        self.predict_proba(py, scores)
    }

    /// Most probable calibrated class per row.
    pub fn predict_class<'py>(
        &self, py: Python<'py>, scores: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<usize>>> {
        let classes = match extract_scores(scores)? {
            PyScores::Matrix(s) => self.inner.predict_class(s.view())?,
            PyScores::Binary(p) => self.inner.predict_class(expand_binary(p.view()).view())?,
        };
        Ok(classes.into_pyarray(py))
    }

    #[getter]
    pub fn coef<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.coef()?.into_pyarray(py))
    }

    #[getter]
    pub fn intercept<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.intercept()?.into_pyarray(py))
    }

    #[getter]
    pub fn weights<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.weights()?.to_owned().into_pyarray(py))
    }

    #[getter]
    pub fn selected_l2(&self) -> PyResult<f64> {
        Ok(self.inner.selected_l2()?)
    }

    #[getter]
    pub fn validation_losses(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.validation_losses()?.to_vec())
    }

    #[getter]
    pub fn converged(&self) -> PyResult<bool> {
        Ok(self.inner.outcome()?.converged)
    }

    #[getter]
    pub fn n_iter(&self) -> PyResult<usize> {
        Ok(self.inner.outcome()?.iterations)
    }
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _dirichlet_calibration<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyDirichletCalibrator>()?;
    Ok(())
}
