//! Bridge from a [`LogLikelihood`] to Argmin's minimization traits.
//!
//! Argmin minimizes, so the adapter reports the cost `c(θ) = −ℓ(θ)` and
//! the gradient `−∇ℓ(θ)`. Both are checked for finiteness here, which keeps
//! a NaN from ever reaching the line search.
use argmin::core::{CostFunction, Error, Gradient};

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
    },
};

#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `−ℓ(θ)`; `NonFiniteCost` if `ℓ(θ)` is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value }.into());
        }
        Ok(-value)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// `−∇ℓ(θ)`.
    ///
    /// # Errors
    /// Model errors from `grad`, `GradientDimMismatch` for a wrong length,
    /// and `InvalidGradient` for the first non-finite entry.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let grad = self.f.grad(theta, self.data)?;
        if grad.len() != theta.len() {
            return Err(
                OptError::GradientDimMismatch { expected: theta.len(), found: grad.len() }.into()
            );
        }
        if let Some((index, &value)) = grad.iter().enumerate().find(|(_, g)| !g.is_finite()) {
            return Err(OptError::InvalidGradient { index, value }.into());
        }
        Ok(-grad)
    }
}
