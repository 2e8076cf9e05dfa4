//! optimization::finite_diff — numerical cross-check of the analytic gradient.
//!
//! Purpose
//! -------
//! Compare the reverse-mode hyperparameter gradient against a
//! finite-difference estimate of the same loss, so that a broken backward
//! pass is caught before it silently steers the optimizer.
//!
//! Key behaviors
//! -------------
//! - [`check_gradient`] differences any argmin [`CostFunction`] +
//!   [`Gradient`] with `Param = Array1<f64>` using central differences,
//!   falling back to forward differences if a perturbed evaluation fails.
//! - Errors raised inside the differencing closure are captured in a shared
//!   cell (the closure itself must return `f64`) and re-raised afterwards.
//!
//! Invariants & assumptions
//! ------------------------
//! - The check point should be strictly inside the hyperparameter box:
//!   a perturbation that leaves the box is an out-of-domain error, not a
//!   clamped value.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use ndarray::Array1;

use crate::optimization::errors::{OptError, OptResult};

/// Analytic vs. numerical gradient at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub analytic: Array1<f64>,
    pub numeric: Array1<f64>,
    /// `max_i |a_i − n_i| / max(|a_i|, |n_i|, 1e-8)`.
    pub max_rel_error: f64,
}

impl GradientCheck {
    pub fn within(&self, tolerance: f64) -> bool {
        self.max_rel_error <= tolerance
    }
}

/// Difference `problem` at `theta` and compare with its analytic gradient.
///
/// # Errors
/// - Any error from the analytic gradient or from a cost evaluation made
///   while differencing, converted to [`OptError`].
/// - [`OptError::NonFiniteGradient`] if the numerical estimate is not finite.
pub fn check_gradient<P>(problem: &P, theta: &Array1<f64>) -> OptResult<GradientCheck>
where
    P: CostFunction<Param = Array1<f64>, Output = f64>
        + Gradient<Param = Array1<f64>, Gradient = Array1<f64>>,
{
    let analytic = problem.gradient(theta)?;

    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost_func = |x: &Array1<f64>| -> f64 {
        match problem.cost(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };

    let mut numeric = theta.central_diff(&cost_func);
    if closure_err.borrow().is_some() {
        closure_err.replace(None);
        numeric = theta.forward_diff(&cost_func);
        if let Some(err) = closure_err.take() {
            return Err(err.into());
        }
    }
    if let Some(value) = numeric.iter().copied().find(|v| !v.is_finite()) {
        return Err(OptError::NonFiniteGradient { name: "finite-difference estimate", value });
    }

    let max_rel_error = analytic
        .iter()
        .zip(numeric.iter())
        .map(|(a, n)| (a - n).abs() / a.abs().max(n.abs()).max(1e-8))
        .fold(0.0_f64, f64::max);

    Ok(GradientCheck { analytic, numeric, max_rel_error })
}
