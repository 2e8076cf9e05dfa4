//! optimization::optimizer — one differentiable hyperparameter update per call.
//!
//! Purpose
//! -------
//! Own the live [`HyperparameterSet`] together with the Adam moment state and
//! advance it one step at a time: evaluate the readout loss and its exact
//! gradient, apply an unconstrained Adam update, then project back into the
//! box constraints.
//!
//! Key behaviors
//! -------------
//! - [`HyperOptimizer::step`] runs
//!   forward (current in-domain values) → gradient → Adam update on
//!   unclamped values → projection, and returns a [`StepReport`].
//! - Projection is clamping; it is not constraint-aware, so the raw update
//!   may leave the box before it is restored within the same step.
//! - [`HyperOptimizer::gradient_check`] compares the analytic gradient with a
//!   finite-difference estimate without mutating anything.
//!
//! Invariants & assumptions
//! ------------------------
//! - After every successful `step`, each hyperparameter lies inside its
//!   declared interval. The forward pass therefore never sees an
//!   out-of-range value produced by this optimizer.
//! - A failed step leaves hyperparameters and moment state untouched.
//! - The ridge penalty is fixed for the lifetime of the optimizer.
use argmin_math::ArgminL2Norm;
use tracing::{debug, warn};

use crate::{
    data::Dataset,
    optimization::{
        adam::{Adam, AdamOptions},
        errors::OptResult,
        finite_diff::{GradientCheck, check_gradient},
        hyperparams::{Hyperparameter, HyperparameterSet},
        objective::ReadoutObjective,
    },
    readout::verify_ridge_penalty,
    reservoir::{HyperGradient, Reservoir},
};

/// OptimizerOptions — fixed settings of the hyperparameter optimizer.
///
/// Fields
/// ------
/// - `ridge_penalty`: `λ ≥ 0` of the readout (not trained).
/// - `washout`: leading steps of each batch excluded from the readout fit.
/// - `adam`: step size and moment decay rates.
///
/// Default
/// -------
/// `λ = 0.02`, `washout = 0`, [`AdamOptions::default`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerOptions {
    pub ridge_penalty: f64,
    pub washout: usize,
    pub adam: AdamOptions,
}

impl OptimizerOptions {
    /// # Errors
    /// [`OptError::InvalidRidgePenalty`](crate::optimization::errors::OptError)
    /// for negative or non-finite `λ`.
    pub fn new(ridge_penalty: f64, washout: usize, adam: AdamOptions) -> OptResult<Self> {
        verify_ridge_penalty(ridge_penalty)?;
        Ok(Self { ridge_penalty, washout, adam })
    }
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self { ridge_penalty: 0.02, washout: 0, adam: AdamOptions::default() }
    }
}

/// What one optimizer step did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Loss evaluated at the hyperparameters the step started from.
    pub loss: f64,
    /// Hyperparameters after the update and projection.
    pub hyperparameters: HyperparameterSet,
    pub gradient: HyperGradient,
    pub grad_norm: f64,
    /// Hyperparameters the projection actually moved.
    pub clipped: Vec<Hyperparameter>,
}

/// HyperOptimizer — the optimization context that owns the live hyperparameters.
#[derive(Debug, Clone)]
pub struct HyperOptimizer {
    hyperparameters: HyperparameterSet,
    options: OptimizerOptions,
    adam: Adam,
    steps: usize,
}

impl HyperOptimizer {
    /// Start from `initial`.
    ///
    /// # Errors
    /// - `OutOfDomainHyperparameter` if any initial value is outside its interval.
    /// - `InvalidRidgePenalty` if `options.ridge_penalty` is invalid.
    pub fn new(initial: HyperparameterSet, options: OptimizerOptions) -> OptResult<Self> {
        initial.check_domain()?;
        verify_ridge_penalty(options.ridge_penalty)?;
        let adam = Adam::new(options.adam, Hyperparameter::ALL.len());
        Ok(Self { hyperparameters: initial, options, adam, steps: 0 })
    }

    pub fn hyperparameters(&self) -> &HyperparameterSet {
        &self.hyperparameters
    }

    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    /// Completed steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Advance the hyperparameters by one projected Adam step.
    ///
    /// # Errors
    /// Anything the objective reports (reservoir failures, numerical
    /// instability of the readout, non-finite loss or gradient). Nothing is
    /// mutated on error.
    pub fn step<R: Reservoir>(&mut self, reservoir: &R, data: &Dataset) -> OptResult<StepReport> {
        let objective = self.objective(reservoir, data)?;
        let evaluation = objective.value_and_grad(&self.hyperparameters)?;
        let grad = evaluation.gradient.to_array();

        let mut theta = self.hyperparameters.to_array();
        self.adam.step(&mut theta, &grad)?;
        let mut updated = HyperparameterSet::from_array(&theta)?;
        let clipped = updated.project();
        for which in &clipped {
            warn!(
                hyperparameter = which.name(),
                raw = theta[which.index()],
                projected = updated.get(*which),
                "update left the box; value clamped"
            );
        }

        self.hyperparameters = updated;
        self.steps += 1;
        let grad_norm = grad.l2_norm();
        debug!(
            step = self.steps,
            loss = evaluation.loss,
            grad_norm,
            rho = updated.rho,
            alpha = updated.alpha,
            decay = updated.decay,
            sw = updated.sw,
            "hyperparameter step"
        );

        Ok(StepReport {
            loss: evaluation.loss,
            hyperparameters: updated,
            gradient: evaluation.gradient,
            grad_norm,
            clipped,
        })
    }

    /// Analytic vs. central-difference gradient at the current hyperparameters.
    ///
    /// The current values should lie strictly inside the box; on a bound the
    /// perturbed evaluation is out of domain and the check falls back to
    /// forward differences.
    pub fn gradient_check<R: Reservoir>(
        &self, reservoir: &R, data: &Dataset,
    ) -> OptResult<GradientCheck> {
        let objective = self.objective(reservoir, data)?;
        check_gradient(&objective, &self.hyperparameters.to_array())
    }

    fn objective<'a, R: Reservoir>(
        &self, reservoir: &'a R, data: &'a Dataset,
    ) -> OptResult<ReadoutObjective<'a, R>> {
        ReadoutObjective::new(reservoir, data, self.options.ridge_penalty, self.options.washout)
    }
}
