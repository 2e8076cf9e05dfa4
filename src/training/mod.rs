//! training — the epoch loop and everything it hands results to.
//!
//! Purpose
//! -------
//! Orchestrate a fixed number of optimizer epochs, keep the per-epoch
//! trajectory, and export it as a JSON archive and an SVG plot.
//!
//! Key behaviors
//! -------------
//! - `trainer`: [`TrainingLoop`], its [`LoopState`] machine, and the
//!   parameterless [`optimize`] entry point.
//! - `metrics`: [`TrainingMetrics`] trajectory with exact JSON round trips.
//! - `report`: the fixed-width console line (loss, alpha, decay, rho, sw).
//! - `plot`: log10 loss and rescaled hyperparameter trajectories as SVG.
//!
//! Conventions
//! -----------
//! - The console line is product output and goes to stdout; diagnostics go
//!   through `tracing`.
//! - All failures surface as [`TrainError`]; nothing is retried.
pub mod errors;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod trainer;

pub use self::errors::{TrainError, TrainResult};
pub use self::metrics::{EpochRecord, TrainingMetrics};
pub use self::trainer::{
    FileSink, LoopState, MetricsSink, TaskOptions, TrainOptions, TrainingLoop, optimize,
    optimize_with,
};
