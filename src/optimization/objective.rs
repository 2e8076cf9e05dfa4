//! optimization::objective — reservoir → ridge readout → MSE, with exact gradients.
//!
//! Purpose
//! -------
//! Evaluate the loss of a hyperparameter set on a dataset and its gradient by
//! reverse-mode differentiation through the whole chain: reservoir forward
//! pass, closed-form ridge solve, prediction, and mean squared error.
//!
//! Key behaviors
//! -------------
//! - [`ReadoutObjective::value_and_grad`] opens one reservoir tape per batch,
//!   stacks the post-washout states of all batches, fits the readout, and
//!   pulls `∂L/∂states` back through each tape. Every tape is consumed before
//!   the call returns.
//! - [`ReadoutObjective::value`] is the tape-free forward evaluation.
//! - The objective also implements argmin's [`CostFunction`] and
//!   [`Gradient`] over the canonical `[ρ, α, decay, sw]` vector, so it can be
//!   handed to argmin tooling and to the finite-difference checker.
//!
//! Invariants & assumptions
//! ------------------------
//! - The reservoir is called only with the hyperparameters passed in; the
//!   objective holds no trainable state.
//! - Loss and gradient are validated finite before being returned.
//! - `λ` is fixed for the lifetime of the objective.
//!
//! Conventions
//! -----------
//! - Rows `0..washout` of every batch are excluded from the readout fit and
//!   receive a zero cotangent.
use argmin::core::{CostFunction, Error, Gradient};
use ndarray::{Array1, Array2, s};

use crate::{
    data::Dataset,
    optimization::{
        errors::{OptError, OptResult},
        hyperparams::HyperparameterSet,
        validation::{validate_gradient, validate_loss},
    },
    readout::{RidgeReadout, mse, readout_loss, verify_ridge_penalty},
    reservoir::{HyperGradient, Reservoir},
};

/// Loss, gradient and fitted readout weights at one hyperparameter point.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub loss: f64,
    pub gradient: HyperGradient,
    pub weights: Array2<f64>,
}

/// ReadoutObjective — the scalar loss as a function of the hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct ReadoutObjective<'a, R: Reservoir> {
    reservoir: &'a R,
    data: &'a Dataset,
    ridge_penalty: f64,
    washout: usize,
}

impl<'a, R: Reservoir> ReadoutObjective<'a, R> {
    /// Bind a reservoir and dataset with a fixed ridge penalty and washout.
    ///
    /// # Errors
    /// - [`OptError::InvalidRidgePenalty`] for negative or non-finite `λ`.
    /// - [`OptError::ShapeMismatch`] if the dataset input width differs from
    ///   the reservoir input size.
    /// - [`OptError::EmptyStates`] if `washout >= data.steps()`.
    pub fn new(
        reservoir: &'a R, data: &'a Dataset, ridge_penalty: f64, washout: usize,
    ) -> OptResult<Self> {
        verify_ridge_penalty(ridge_penalty)?;
        if data.input_size() != reservoir.input_size() {
            return Err(OptError::ShapeMismatch {
                what: "dataset input channels",
                expected: reservoir.input_size(),
                found: data.input_size(),
            });
        }
        if washout >= data.steps() {
            return Err(OptError::EmptyStates { rows: data.steps(), washout });
        }
        Ok(Self { reservoir, data, ridge_penalty, washout })
    }

    pub fn ridge_penalty(&self) -> f64 {
        self.ridge_penalty
    }

    /// Loss only; no tapes are recorded.
    pub fn value(&self, hp: &HyperparameterSet) -> OptResult<f64> {
        let mut states = Vec::with_capacity(self.data.batches());
        for b in 0..self.data.batches() {
            states.push(self.reservoir.states(self.data.input(b), hp)?);
        }
        let (x, y) = self.stack(&states);
        let solution = RidgeReadout::solve(x.view(), y.view(), self.ridge_penalty)?;
        let loss = mse(solution.predict(x.view()).view(), y.view());
        validate_loss(loss)?;
        Ok(loss)
    }

    /// Loss and its exact gradient with respect to every hyperparameter.
    ///
    /// # Errors
    /// - Reservoir failures (including out-of-domain hyperparameters).
    /// - [`OptError::NumericalInstability`] from the readout solve.
    /// - [`OptError::NonFiniteLoss`] / [`OptError::NonFiniteGradient`].
    pub fn value_and_grad(&self, hp: &HyperparameterSet) -> OptResult<Evaluation> {
        let batches = self.data.batches();
        let mut states = Vec::with_capacity(batches);
        let mut tapes = Vec::with_capacity(batches);
        for b in 0..batches {
            let (s, tape) = self.reservoir.forward(self.data.input(b), hp)?;
            states.push(s);
            tapes.push(tape);
        }

        let (x, y) = self.stack(&states);
        let fitted = readout_loss(x.view(), y.view(), self.ridge_penalty)?;
        validate_loss(fitted.loss)?;

        let kept = self.data.steps() - self.washout;
        let units = self.reservoir.units();
        let mut gradient = HyperGradient::default();
        for (b, tape) in tapes.into_iter().enumerate() {
            let mut d_states = Array2::<f64>::zeros((self.data.steps(), units));
            d_states
                .slice_mut(s![self.washout.., ..])
                .assign(&fitted.d_states.slice(s![b * kept..(b + 1) * kept, ..]));
            let part = self.reservoir.backward(tape, d_states.view())?;
            gradient.accumulate(&part);
        }
        validate_gradient(&gradient)?;

        Ok(Evaluation { loss: fitted.loss, gradient, weights: fitted.weights })
    }

    /// Stack post-washout states and targets of every batch along time.
    fn stack(&self, states: &[Array2<f64>]) -> (Array2<f64>, Array2<f64>) {
        let kept = self.data.steps() - self.washout;
        let rows = kept * states.len();
        let units = self.reservoir.units();
        let mut x = Array2::<f64>::zeros((rows, units));
        let mut y = Array2::<f64>::zeros((rows, self.data.output_size()));
        for (b, st) in states.iter().enumerate() {
            let block = s![b * kept..(b + 1) * kept, ..];
            x.slice_mut(block).assign(&st.slice(s![self.washout.., ..]));
            y.slice_mut(block).assign(&self.data.target(b).slice(s![self.washout.., ..]));
        }
        (x, y)
    }
}

impl<'a, R: Reservoir> CostFunction for ReadoutObjective<'a, R> {
    type Param = Array1<f64>;
    type Output = f64;

    /// Loss at the canonical-order hyperparameter vector.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let hp = HyperparameterSet::from_array(theta)?;
        Ok(self.value(&hp)?)
    }
}

impl<'a, R: Reservoir> Gradient for ReadoutObjective<'a, R> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    /// Reverse-mode gradient at the canonical-order hyperparameter vector.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let hp = HyperparameterSet::from_array(theta)?;
        Ok(self.value_and_grad(&hp)?.gradient.to_array())
    }
}
