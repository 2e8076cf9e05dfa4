//! reservoir — differentiable state-sequence producers driven by four hyperparameters.
//!
//! Purpose
//! -------
//! Define the contract the optimizer consumes from a reservoir: a causal,
//! differentiable map from an input sequence and a [`HyperparameterSet`] to a
//! state sequence, plus a reverse-mode pass that turns state cotangents into
//! hyperparameter gradients. Ship one concrete echo-state implementation.
//!
//! Key behaviors
//! -------------
//! - [`Reservoir::forward`] runs the recurrence with the *current*
//!   hyperparameter values and returns the `(T × units)` states together with
//!   a recording [`Reservoir::Tape`].
//! - [`Reservoir::backward`] **consumes** that tape: every recording is
//!   opened by one forward call and released by exactly one backward call
//!   inside the same optimizer step.
//! - [`echo_state::EchoStateReservoir`] implements the contract for a leaky
//!   tanh reservoir with seeded, spectrally normalized weights.
//!
//! Invariants & assumptions
//! ------------------------
//! - Causality: row `t` of the states depends only on input rows `0..=t`.
//! - Implementations reject hyperparameters outside their declared domain
//!   with [`ReservoirError::OutOfDomain`] instead of running unstable
//!   dynamics.
//! - Tapes are plain owned data; they never alias optimizer state.
//!
//! Conventions
//! -----------
//! - Sequences are `Array2<f64>` with one row per time step.
//! - Gradients are returned as [`HyperGradient`], field-for-field aligned
//!   with [`HyperparameterSet`].
//!
//! Testing notes
//! -------------
//! - `echo_state` tests cover causality, weight normalization, determinism
//!   under a fixed seed, and agreement of `backward` with central finite
//!   differences of a scalar functional of the states.
pub mod echo_state;
pub mod errors;
pub mod options;

use ndarray::{Array1, Array2, ArrayView2};

use crate::optimization::hyperparams::HyperparameterSet;

pub use self::echo_state::{EchoStateReservoir, EchoStateTape};
pub use self::errors::{ReservoirError, ReservoirResult};
pub use self::options::ReservoirOptions;

/// Gradient of a scalar loss with respect to each hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HyperGradient {
    pub rho: f64,
    pub alpha: f64,
    pub decay: f64,
    pub sw: f64,
}

impl HyperGradient {
    /// Canonical order `[ρ, α, decay, sw]`, matching
    /// [`HyperparameterSet::to_array`].
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(vec![self.rho, self.alpha, self.decay, self.sw])
    }

    /// Element-wise accumulation, used to sum contributions over batches.
    pub fn accumulate(&mut self, other: &HyperGradient) {
        self.rho += other.rho;
        self.alpha += other.alpha;
        self.decay += other.decay;
        self.sw += other.sw;
    }
}

/// Reservoir — causal, differentiable `forward(inputs, hyperparameters) -> states`.
///
/// Implementors own any fixed internal weights; the trainable quantities
/// arrive through `hp` on every call so that each optimizer step sees the
/// values it is differentiating.
pub trait Reservoir {
    /// Recording of the forward pass needed for the backward pass.
    type Tape;

    /// Number of state units (columns of the state sequence).
    fn units(&self) -> usize;

    /// Expected number of input columns.
    fn input_size(&self) -> usize;

    /// Run the recurrence over `inputs` (`T × input_size`) and record a tape.
    fn forward(
        &self, inputs: ArrayView2<'_, f64>, hp: &HyperparameterSet,
    ) -> ReservoirResult<(Array2<f64>, Self::Tape)>;

    /// Pull `d_states` (`∂L/∂states`, same shape as the states) back to the
    /// hyperparameters. Consumes the tape.
    fn backward(
        &self, tape: Self::Tape, d_states: ArrayView2<'_, f64>,
    ) -> ReservoirResult<HyperGradient>;

    /// Forward pass without keeping the tape.
    fn states(
        &self, inputs: ArrayView2<'_, f64>, hp: &HyperparameterSet,
    ) -> ReservoirResult<Array2<f64>> {
        self.forward(inputs, hp).map(|(states, _tape)| states)
    }
}
