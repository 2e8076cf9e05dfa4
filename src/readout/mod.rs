//! readout — closed-form linear readout trained on reservoir states.
//!
//! Purpose
//! -------
//! Fit the linear map from reservoir states to targets by ridge regression,
//! freshly for every optimizer step, and expose the reverse-mode pass that
//! lets hyperparameter gradients flow through the fitted weights.
//!
//! Key behaviors
//! -------------
//! - [`RidgeReadout::solve`]: `W = (XᵀX + λI)⁻¹ XᵀY` with conditioning
//!   checks that fail fast on singular systems.
//! - [`readout_loss`]: solve, predict, score by MSE, and return `∂L/∂X`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nothing is cached between calls; weights have no identity beyond the
//!   call that produced them.
//! - Numerical failures surface as
//!   [`OptError::NumericalInstability`](crate::optimization::errors::OptError).
//!
//! Downstream usage
//! ----------------
//! - `optimization::objective` stacks the states of every batch, calls
//!   [`readout_loss`], and hands `d_states` back to the reservoir.
pub mod ridge;

pub use self::ridge::{
    RCOND_MIN, ReadoutLoss, RidgeReadout, RidgeSolution, mse, readout_loss, verify_ridge_penalty,
};
