//! optimization — differentiable hyperparameter search for reservoirs.
//!
//! Purpose
//! -------
//! Tune the continuous reservoir hyperparameters (ρ, α, decay, sw) by
//! gradient descent on the loss of a freshly fitted ridge readout. Callers
//! supply a [`Reservoir`](crate::reservoir::Reservoir) and a
//! [`Dataset`](crate::data::Dataset); this layer owns the live
//! hyperparameters, the Adam state, and the single error surface.
//!
//! Key behaviors
//! -------------
//! - `objective`: reservoir → ridge readout → MSE, with the exact
//!   reverse-mode gradient through the whole chain. Also exposed as an
//!   argmin `CostFunction` + `Gradient` problem.
//! - `optimizer`: one projected Adam step per call; forward on the current
//!   values, unconstrained update, then clamping into the box.
//! - `hyperparams`: names, bounds, canonical vector layout and projection.
//! - `finite_diff`: central-difference cross-check of the analytic gradient.
//! - Configuration issues, numerical failures, reservoir failures and
//!   backend errors are all normalized into `errors::OptError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - After every successful optimizer step each hyperparameter lies in its
//!   declared closed interval.
//! - No state survives a step except the hyperparameters and the Adam
//!   moments: reservoir states, tapes and readout weights are rebuilt every
//!   call.
//! - Invalid states are reported as `OptError`, never as panics.
//!
//! Conventions
//! -----------
//! - Vector layout is `[ρ, α, decay, sw]` (`Hyperparameter::ALL` order).
//! - This module logs through `tracing` only; it never prints and never
//!   installs a subscriber.
//!
//! Testing notes
//! -------------
//! - `optimizer` tests use a recording stub reservoir to pin the ordering
//!   of forward, update and projection, and the in-domain invariant.
//! - `objective` and `finite_diff` tests compare the analytic gradient with
//!   finite differences on a seeded echo-state reservoir.

pub mod adam;
pub mod errors;
pub mod finite_diff;
pub mod hyperparams;
pub mod objective;
pub mod optimizer;
pub mod validation;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use esn_hyperopt::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::adam::{Adam, AdamOptions};
    pub use super::errors::{OptError, OptResult};
    pub use super::finite_diff::{GradientCheck, check_gradient};
    pub use super::hyperparams::{Bounds, Hyperparameter, HyperparameterSet};
    pub use super::objective::{Evaluation, ReadoutObjective};
    pub use super::optimizer::{HyperOptimizer, OptimizerOptions, StepReport};
}
