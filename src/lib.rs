//! esn_hyperopt — gradient-based hyperparameter optimization of echo-state reservoirs.
//!
//! Purpose
//! -------
//! Tune the continuous hyperparameters of a reservoir (spectral radius ρ,
//! leak rate α, decay, input scale sw) by differentiating the loss of a
//! closed-form ridge-regression readout with respect to them, and descending
//! that gradient with Adam under box constraints.
//!
//! Key behaviors
//! -------------
//! - `reservoir`: the [`Reservoir`](reservoir::Reservoir) trait (forward pass
//!   plus tape-consuming backward pass) and the seeded
//!   [`EchoStateReservoir`](reservoir::EchoStateReservoir).
//! - `readout`: ridge solve `W = (XᵀX + λI)⁻¹XᵀY` with conditioning checks
//!   and its reverse-mode pass.
//! - `optimization`: hyperparameters and bounds, the differentiable
//!   objective, Adam, and the projected optimizer step.
//! - `signals` / `data`: deterministic test signals and the batched
//!   delayed-recall dataset.
//! - `training`: the fixed-length epoch loop, console report, JSON archive,
//!   SVG plot, and the parameterless [`optimize`](training::optimize) entry
//!   point.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single-threaded and synchronous. Each epoch is forward, readout solve,
//!   loss, backward, update, projection, report; an epoch either completes
//!   or the run stops with an error.
//! - After every optimizer step each hyperparameter lies in its declared
//!   interval.
//! - Reservoir states, tapes and readout weights live for one step only.
//!
//! Conventions
//! -----------
//! - Errors are layered `ReservoirError → OptError → TrainError`, each with
//!   a result alias; library code does not panic on reachable paths.
//! - Diagnostics go through `tracing`; the library never installs a
//!   subscriber.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code they cover. End-to-end scenarios
//!   (default run, singular readout, zero epochs, determinism, archive round
//!   trip) live under `tests/`.
pub mod data;
pub mod optimization;
pub mod readout;
pub mod reservoir;
pub mod signals;
pub mod training;
