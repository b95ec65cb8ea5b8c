//! L-BFGS construction from [`MLEOptions`].
//!
//! The solver only receives the tolerance part of the options; the starting
//! point and the iteration cap belong to the executor in
//! [`run_lbfgs`](super::run::run_lbfgs).
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{DEFAULT_LBFGS_MEM, Lbfgs},
    },
};

/// L-BFGS over `line_search` with the configured memory and tolerances.
/// Unset tolerances keep Argmin's defaults.
///
/// # Errors
/// Tolerances Argmin rejects, converted into `OptError`.
pub fn build_lbfgs<L>(line_search: L, opts: &MLEOptions) -> OptResult<Lbfgs<L>> {
    let mut solver = Lbfgs::new(line_search, opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM));
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}
