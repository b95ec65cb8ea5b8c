//! core — preprocessing, targets, weight structure, and options for
//! Dirichlet calibration.
//!
//! Purpose
//! -------
//! Collect the building blocks shared by every calibrator variant: the
//! log-probability design matrix, target encoding, the structural
//! parameterization of the (k + 1) × (k − 1) weight matrix, log-loss
//! scoring, and fit-time options. The objective and facade in
//! `calibration::models` are built on top of these primitives.
//!
//! Key behaviors
//! -------------
//! - [`log_features`] turns an N × k score matrix into `X′ = [ln clip(S), 1]`;
//!   [`expand_binary`] lifts a positive-class vector into two columns.
//! - [`Targets`] accepts labels or (soft) indicator matrices and yields a
//!   row-normalized N × k indicator.
//! - [`WeightStructure`] maps unconstrained `θ` to `W` and back, carries the
//!   per-entry [`Bound`]s, ties, and [`PenaltyScope`] masks.
//! - [`CalibrationData`] holds the validated `(X′, Y)` pair for one data set.
//! - [`log_loss`] scores probabilities for λ selection.
//! - [`CalibOptions`] / [`CalibratorKind`] hold validated configuration.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scores are finite; values outside `[0, 1]` are clipped, never rejected.
//! - Fixed weight entries are exactly 0 for every `θ`; sign-constrained
//!   entries stay in their half-line through the softplus transform.
//! - Class `k − 1` is the reference class with logit 0.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; weights are raveled row-major.
//! - No I/O or logging happens here. Errors are reported as
//!   [`CalibError`](crate::calibration::errors::CalibError).
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover clipping, target encoding, bound
//!   layouts and ties, penalty masks, seeded initialization, and option
//!   validation.

pub mod data;
pub mod metrics;
pub mod options;
pub mod preprocess;
pub mod structure;
pub mod targets;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::CalibrationData;
pub use self::metrics::log_loss;
pub use self::options::{CalibOptions, CalibratorKind, DEFAULT_LOGISTIC_C, validate_candidates};
pub use self::preprocess::{expand_binary, log_features, validate_scores};
pub use self::structure::{
    Bound, MatrixType, PenaltyScope, WeightInit, WeightStructure, identity_weights, random_weights,
};
pub use self::targets::{Targets, ensure_multiple_classes, one_hot};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::data::CalibrationData;
    pub use super::options::{CalibOptions, CalibratorKind};
    pub use super::structure::MatrixType;
    pub use super::targets::Targets;
}
