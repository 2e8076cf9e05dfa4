//! Integration tests for the reservoir hyperparameter optimization pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end run: signal generation, delayed-recall dataset,
//!   seeded echo-state reservoir, differentiable ridge readout, projected
//!   Adam steps, the epoch loop, and the exported archive and plot.
//!
//! Coverage
//! --------
//! - Default run on the sum-of-sines task: loss decreases and every epoch
//!   ends in-domain.
//! - Singular readout with `λ = 0` aborts with `NumericalInstability`.
//! - Zero epochs: empty trajectory, no forward passes.
//! - Determinism across independent runs.
//! - Archive round trip and plot output on disk.
//!
//! Exclusions
//! ----------
//! - Gradient formulas, Adam arithmetic and formatting details; those are
//!   covered by unit tests next to the code.
use std::cell::Cell;

use esn_hyperopt::{
    data::Dataset,
    optimization::{
        adam::AdamOptions,
        errors::OptError,
        hyperparams::HyperparameterSet,
        optimizer::{HyperOptimizer, OptimizerOptions},
    },
    reservoir::{HyperGradient, Reservoir, ReservoirResult},
    training::{
        TaskOptions, TrainError, TrainOptions, TrainingLoop, TrainingMetrics, optimize_with,
    },
};
use ndarray::{Array2, ArrayView2};
use tempfile::TempDir;

/// Quiet loop options writing into `dir`.
fn options_in(dir: &TempDir, epochs: usize) -> TrainOptions {
    TrainOptions {
        epochs,
        verbose: false,
        metrics_path: dir.path().join("data.json"),
        plot_path: dir.path().join("loss.svg"),
    }
}

/// Reservoir whose two state columns are identical copies of the input,
/// so `XᵀX` is singular. Counts forward passes.
struct DuplicateColumns {
    forwards: Cell<usize>,
}

impl Reservoir for DuplicateColumns {
    type Tape = ();

    fn units(&self) -> usize {
        2
    }

    fn input_size(&self) -> usize {
        1
    }

    fn forward(
        &self, inputs: ArrayView2<'_, f64>, _hp: &HyperparameterSet,
    ) -> ReservoirResult<(Array2<f64>, Self::Tape)> {
        self.forwards.set(self.forwards.get() + 1);
        Ok((Array2::from_shape_fn((inputs.nrows(), 2), |(t, _)| inputs[[t, 0]]), ()))
    }

    fn backward(
        &self, _tape: Self::Tape, _d_states: ArrayView2<'_, f64>,
    ) -> ReservoirResult<HyperGradient> {
        Ok(HyperGradient::default())
    }
}

fn small_task() -> Dataset {
    TaskOptions { steps: 60, delay: 5, batches: 2 }.build().unwrap()
}

#[test]
// Purpose
// -------
// Default run: starting from ρ = 1, α = 0.5, decay = 0.01, sw = 1 on the
// 700-step sum-of-sines task, 50 epochs reduce the loss and never leave the
// hyperparameter box.
//
// Given
// -----
// - Default reservoir and optimizer settings, one batch of 700 steps.
//
// Expect
// ------
// - 50 records; final loss < first loss; every record in-domain.
fn default_run_reduces_loss_and_stays_in_domain() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let task = TaskOptions { batches: 1, ..TaskOptions::default() };

    // Act
    let metrics = optimize_with(&task, &options_in(&dir, 50)).unwrap();

    // Assert
    assert_eq!(metrics.len(), 50);
    let first = metrics.get(0).unwrap().loss;
    let last = metrics.last().unwrap().loss;
    assert!(last < first, "final loss {last} not below first loss {first}");
    for record in metrics.records() {
        assert!(record.loss.is_finite() && record.loss >= 0.0);
        assert!(record.hyperparameters().check_domain().is_ok(), "{record:?}");
    }
}

#[test]
// Purpose
// -------
// With λ = 0 and linearly dependent state columns the readout system is
// singular; the run must stop with a numerical-instability error instead of
// producing NaN weights.
//
// Given
// -----
// - A reservoir emitting two identical columns, λ = 0, 3 epochs.
//
// Expect
// ------
// - `TrainError::Optimization { source: NumericalInstability { .. } }` on
//   the first epoch.
fn singular_readout_aborts_run() {
    // Arrange
    let res = DuplicateColumns { forwards: Cell::new(0) };
    let data = small_task();
    let opts = OptimizerOptions::new(0.0, 0, AdamOptions::default()).unwrap();
    let optimizer = HyperOptimizer::new(HyperparameterSet::default(), opts).unwrap();
    let dir = tempfile::tempdir().unwrap();

    // Act
    let err = TrainingLoop::new(&res, &data, optimizer, &options_in(&dir, 3)).run().unwrap_err();

    // Assert
    assert!(
        matches!(err, TrainError::Optimization { source: OptError::NumericalInstability { .. } }),
        "{err:?}"
    );
    assert_eq!(res.forwards.get(), data.batches());
}

#[test]
// Purpose
// -------
// Zero epochs: nothing runs, an empty trajectory is exported.
//
// Given
// -----
// - epochCount = 0 through both the stub loop and `optimize_with`.
//
// Expect
// ------
// - No forward passes; empty metrics; the archive on disk reloads as empty.
fn zero_epochs_yields_empty_trajectory() {
    // Arrange
    let res = DuplicateColumns { forwards: Cell::new(0) };
    let data = small_task();
    let optimizer =
        HyperOptimizer::new(HyperparameterSet::default(), OptimizerOptions::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, 0);

    // Act
    let from_loop = TrainingLoop::new(&res, &data, optimizer, &options).run().unwrap();
    let from_entry = optimize_with(&TaskOptions::default(), &options).unwrap();

    // Assert
    assert!(from_loop.is_empty());
    assert_eq!(res.forwards.get(), 0);
    assert!(from_entry.is_empty());
    assert!(TrainingMetrics::load_json(&options.metrics_path).unwrap().is_empty());
    assert!(options.plot_path.exists());
}

#[test]
// Purpose
// -------
// Identical seeds, data and initial values give identical trajectories.
//
// Given
// -----
// - Two independent 5-epoch runs on a 120-step task.
//
// Expect
// ------
// - Bit-for-bit equal metrics.
fn runs_are_deterministic() {
    // Arrange
    let task = TaskOptions { steps: 120, delay: 5, batches: 2 };
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    // Act
    let a = optimize_with(&task, &options_in(&dir_a, 5)).unwrap();
    let b = optimize_with(&task, &options_in(&dir_b, 5)).unwrap();

    // Assert
    assert_eq!(a, b);
    assert_eq!(a.len(), 5);
}

#[test]
// Purpose
// -------
// The exported archive reproduces the returned trajectory exactly and the
// plot is written.
//
// Given
// -----
// - A 4-epoch run on a 150-step task.
//
// Expect
// ------
// - `load_json(data.json) == metrics`; `loss.svg` is a complete SVG
//   document naming the loss panel and every hyperparameter.
fn exported_archive_and_plot_match_run() {
    // Arrange
    let task = TaskOptions { steps: 150, delay: 5, batches: 1 };
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, 4);

    // Act
    let metrics = optimize_with(&task, &options).unwrap();

    // Assert
    let loaded = TrainingMetrics::load_json(&options.metrics_path).unwrap();
    assert_eq!(loaded, metrics);
    let svg = std::fs::read_to_string(&options.plot_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    for name in ["log10 loss", "alpha", "decay", "rho", "sw"] {
        assert!(svg.contains(name), "plot is missing {name}");
    }
}
