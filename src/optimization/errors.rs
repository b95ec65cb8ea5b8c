//! Optimizer error surface.
//!
//! Every failure of the L-BFGS layer, whether bad configuration, an
//! objective that misbehaves at some `θ`, or a solver that gives up, is
//! reported as one [`OptError`]. Argmin's boxed errors are unpacked in
//! `From<argmin::core::Error>` so callers never match on backend types.
use argmin::core::{ArgminError, Error};

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Configuration ----
    /// A gradient or cost-change tolerance that is not finite and positive.
    InvalidTolerance { name: &'static str, value: f64 },
    /// Iteration cap of zero.
    InvalidMaxIter { max_iter: usize },
    /// No stopping rule at all.
    NoTolerancesProvided,
    /// Unknown line-search name.
    InvalidLineSearch { name: String },
    /// L-BFGS history of zero.
    InvalidLBFGSMem { mem: usize },

    // ---- Objective ----
    NonFiniteCost { value: f64 },
    /// Free-parameter vector does not match the weight structure.
    ThetaLengthMismatch { expected: usize, actual: usize },
    /// Non-finite entry in the starting point.
    InvalidThetaInput { index: usize, value: f64 },
    /// Feature and target matrices disagree on samples or classes.
    ObjectiveShapeMismatch { features: (usize, usize), targets: (usize, usize) },
    GradientDimMismatch { expected: usize, found: usize },
    InvalidGradient { index: usize, value: f64 },

    // ---- Outcome ----
    MissingThetaHat,
    InvalidThetaHat { index: usize, value: f64 },

    // ---- Backend ----
    /// Argmin stopped with an error of the named kind.
    Solver { kind: &'static str, text: String },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            OptError::InvalidTolerance { name, value } => {
                write!(f, "Invalid {name} tolerance {value}: must be finite and positive")
            }
            OptError::InvalidMaxIter { max_iter } => {
                write!(f, "Invalid maximum iterations {max_iter}: must be greater than zero")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of tol_grad, tol_cost, max_iter is required")
            }
            OptError::InvalidLineSearch { name } => {
                write!(f, "Unknown line searcher '{name}', expected 'MoreThuente' or 'HagerZhang'")
            }
            OptError::InvalidLBFGSMem { mem } => {
                write!(f, "Invalid L-BFGS memory {mem}: must be greater than zero")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => write!(f, "Non-finite cost value: {value}"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }
            OptError::ObjectiveShapeMismatch { features, targets } => write!(
                f,
                "Objective shape mismatch: features {features:?} incompatible with targets {targets:?}"
            ),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value } => {
                write!(f, "Non-finite gradient at index {index}: {value}")
            }

            // ---- Outcome ----
            OptError::MissingThetaHat => write!(f, "Solver returned no parameter estimate"),
            OptError::InvalidThetaHat { index, value } => {
                write!(f, "Non-finite parameter estimate at index {index}: {value}")
            }

            // ---- Backend ----
            OptError::Solver { kind, text } => write!(f, "Solver error ({kind}): {text}"),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        // Objective callbacks box their own OptError; unwrap those first.
        let err = match err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        let argmin_err = match err.downcast::<ArgminError>() {
            Ok(argmin_err) => argmin_err,
            Err(other) => return OptError::Solver { kind: "backend", text: other.to_string() },
        };
        let (kind, text) = match argmin_err {
            ArgminError::InvalidParameter { text } => ("invalid parameter", text),
            ArgminError::NotImplemented { text } => ("not implemented", text),
            ArgminError::NotInitialized { text } => ("not initialized", text),
            ArgminError::ConditionViolated { text } => ("condition violated", text),
            ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
            ArgminError::PotentialBug { text } => ("potential bug", text),
            ArgminError::ImpossibleError { text } => ("impossible error", text),
            other => ("unknown", other.to_string()),
        };
        OptError::Solver { kind, text }
    }
}
