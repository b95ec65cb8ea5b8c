//! Entry point: maximize a [`LogLikelihood`] with L-BFGS.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::build_lbfgs,
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
        types::{HagerZhangLS, MoreThuenteLS},
    },
};

/// Maximize a log-likelihood `ℓ(θ)` using L-BFGS with the chosen line search.
///
/// `f.check` vets `theta0` first; the solver then minimizes `c(θ) = −ℓ(θ)`
/// through an [`ArgMinAdapter`].
///
/// # Errors
/// Errors from `f.check`, solver construction, and the run itself.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use dirichlet_calibration::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{Grad, LogLikelihood, MLEOptions, Theta, maximize},
/// };
///
/// struct Bowl;
/// impl LogLikelihood for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
///     fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
///         Ok(theta.mapv(|t| -2.0 * t))
///     }
/// }
///
/// let out = maximize(&Bowl, array![0.1, -0.2, 0.3], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), dirichlet_calibration::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            run_lbfgs(theta0, opts, problem, build_lbfgs(MoreThuenteLS::new(), opts)?)
        }
        LineSearcher::HagerZhang => {
            run_lbfgs(theta0, opts, problem, build_lbfgs(HagerZhangLS::new(), opts)?)
        }
    }
}
