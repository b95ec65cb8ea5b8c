//! Executor wrapper: run a configured L-BFGS solver from `θ₀` and turn the
//! final Argmin state into an [`OptimOutcome`].
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient, observers::ObserverMode};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter},
};

/// Solver state shared by both line-search variants.
pub type LbfgsState = IterState<Theta, Grad, (), (), (), f64>;

/// Run `solver` on `problem` starting at `theta0`.
///
/// `opts.tols.max_iter` caps the executor. With the `obs_slog` feature and
/// `opts.verbose`, the starting log-likelihood goes to `log::debug!` and a
/// terminal slog observer reports every iteration.
///
/// # Errors
/// - Objective and line-search failures, via `From<argmin::core::Error>`.
/// - Unusable final estimates, via [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, LbfgsState> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let ell0 = -problem.cost(&theta0)?;
        let grad0 = problem.gradient(&theta0)?.l2_norm();
        log::debug!("L-BFGS start: ell(theta0) = {ell0:.6}, ||grad|| = {grad0:.6}");
    }
    let max_iter = opts.tols.max_iter;
    let executor = Executor::new(problem, solver).configure(|state| match max_iter {
        Some(cap) => state.param(theta0).max_iters(cap as u64),
        None => state.param(theta0),
    });
    #[cfg(feature = "obs_slog")]
    let executor = if opts.verbose {
        executor.add_observer(argmin_observer_slog::SlogLogger::term_noblock(), ObserverMode::Always)
    } else {
        executor
    };

    let mut state = executor.run()?.state().clone();
    let termination = state.get_termination_status().clone();
    OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        &termination,
        state.get_iter(),
        state.take_gradient(),
    )
}
