//! optimization::adam — adaptive moment estimation for the hyperparameter vector.
//!
//! Purpose
//! -------
//! Apply one Adam update per optimizer step to the canonical
//! `[ρ, α, decay, sw]` vector, keeping first/second moment estimates across
//! steps.
//!
//! Key behaviors
//! -------------
//! - `m ← β₁m + (1 − β₁)g`, `v ← β₂v + (1 − β₂)g²`.
//! - Bias correction folded into the step size:
//!   `lr_t = lr · √(1 − β₂ᵗ) / (1 − β₁ᵗ)`, then `θ ← θ − lr_t · m / (√v + ε)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The update is unconstrained; box constraints are applied afterwards by
//!   the caller.
//! - Gradients are validated as finite before reaching [`Adam::step`].
//! - Moment state lives only as long as the owning optimizer; it is never
//!   persisted.
use ndarray::Array1;

use crate::optimization::{
    errors::{OptError, OptResult},
    validation::{verify_epsilon, verify_learning_rate, verify_moment_decay},
};

/// AdamOptions — fixed step size and moment decay rates.
///
/// Default
/// -------
/// - `learning_rate = 0.02`, `beta1 = 0.9`, `beta2 = 0.999`, `epsilon = 1e-7`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamOptions {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl AdamOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLearningRate`] unless `learning_rate` is finite and `> 0`.
    /// - [`OptError::InvalidMomentDecay`] unless each beta lies in `[0, 1)`.
    /// - [`OptError::InvalidEpsilon`] unless `epsilon` is finite and `> 0`.
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> OptResult<Self> {
        verify_learning_rate(learning_rate)?;
        verify_moment_decay("beta1", beta1)?;
        verify_moment_decay("beta2", beta2)?;
        verify_epsilon(epsilon)?;
        Ok(Self { learning_rate, beta1, beta2, epsilon })
    }

    /// Default decay rates with a custom learning rate.
    pub fn with_learning_rate(learning_rate: f64) -> OptResult<Self> {
        let defaults = Self::default();
        Self::new(learning_rate, defaults.beta1, defaults.beta2, defaults.epsilon)
    }
}

impl Default for AdamOptions {
    fn default() -> Self {
        Self { learning_rate: 0.02, beta1: 0.9, beta2: 0.999, epsilon: 1e-7 }
    }
}

/// Adam moment state for a fixed-length parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    options: AdamOptions,
    m: Array1<f64>,
    v: Array1<f64>,
    t: u64,
}

impl Adam {
    pub fn new(options: AdamOptions, dim: usize) -> Self {
        Self { options, m: Array1::zeros(dim), v: Array1::zeros(dim), t: 0 }
    }

    pub fn options(&self) -> &AdamOptions {
        &self.options
    }

    /// Number of updates applied so far.
    pub fn iterations(&self) -> u64 {
        self.t
    }

    /// First and second moment estimates.
    pub fn moments(&self) -> (&Array1<f64>, &Array1<f64>) {
        (&self.m, &self.v)
    }

    /// Apply one update to `params` in place.
    ///
    /// # Errors
    /// [`OptError::HyperparameterLengthMismatch`] if `params` or `grad` do
    /// not match the moment dimension. Nothing is mutated in that case.
    pub fn step(&mut self, params: &mut Array1<f64>, grad: &Array1<f64>) -> OptResult<()> {
        let dim = self.m.len();
        for len in [params.len(), grad.len()] {
            if len != dim {
                return Err(OptError::HyperparameterLengthMismatch { expected: dim, found: len });
            }
        }

        let AdamOptions { learning_rate, beta1, beta2, epsilon } = self.options;
        self.t += 1;
        let t = self.t as i32;
        let lr_t = learning_rate * (1.0 - beta2.powi(t)).sqrt() / (1.0 - beta1.powi(t));

        for i in 0..dim {
            let g = grad[i];
            self.m[i] = beta1 * self.m[i] + (1.0 - beta1) * g;
            self.v[i] = beta2 * self.v[i] + (1.0 - beta2) * g * g;
            params[i] -= lr_t * self.m[i] / (self.v[i].sqrt() + epsilon);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The first Adam step moves each coordinate by ≈ lr against the sign of
    // its gradient, independent of gradient magnitude.
    //
    // Given
    // -----
    // - lr = 0.02, params [1, 1, 1], gradient [1000, −0.001, 5].
    //
    // Expect
    // ------
    // - params ≈ [0.98, 1.02, 0.98].
    fn first_step_moves_by_learning_rate_against_gradient_sign() {
        // Arrange
        let mut adam = Adam::new(AdamOptions::default(), 3);
        let mut params = array![1.0, 1.0, 1.0];
        let grad = array![1000.0, -0.001, 5.0];

        // Act
        adam.step(&mut params, &grad).unwrap();

        // Assert
        assert_relative_eq!(params[0], 0.98, epsilon = 1e-6);
        assert_relative_eq!(params[1], 1.02, epsilon = 1e-4);
        assert_relative_eq!(params[2], 0.98, epsilon = 1e-6);
        assert_eq!(adam.iterations(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Repeated steps on a convex quadratic should approach its minimum.
    //
    // Given
    // -----
    // - f(θ) = ‖θ − c‖² with c = [0.3, −0.7], θ₀ = 0, lr = 0.05, 2000 steps.
    //
    // Expect
    // ------
    // - θ within 1e-2 of c.
    fn converges_on_a_quadratic() {
        // Arrange
        let c = array![0.3, -0.7];
        let mut adam = Adam::new(AdamOptions::with_learning_rate(0.05).unwrap(), 2);
        let mut theta = array![0.0, 0.0];

        // Act
        for _ in 0..2000 {
            let grad = (&theta - &c) * 2.0;
            adam.step(&mut theta, &grad).unwrap();
        }

        // Assert
        assert_relative_eq!(theta[0], c[0], epsilon = 1e-2);
        assert_relative_eq!(theta[1], c[1], epsilon = 1e-2);
    }

    #[test]
    // Purpose
    // -------
    // A length mismatch must be rejected without touching any state.
    //
    // Given
    // -----
    // - A 4-dimensional Adam and a 3-element gradient.
    //
    // Expect
    // ------
    // - `HyperparameterLengthMismatch`; iteration count stays 0.
    fn step_rejects_length_mismatch() {
        // Arrange
        let mut adam = Adam::new(AdamOptions::default(), 4);
        let mut params = Array1::zeros(4);

        // Act
        let err = adam.step(&mut params, &Array1::zeros(3)).unwrap_err();

        // Assert
        assert_eq!(err, OptError::HyperparameterLengthMismatch { expected: 4, found: 3 });
        assert_eq!(adam.iterations(), 0);
    }
}
