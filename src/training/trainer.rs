//! training::trainer — fixed-length epoch loop and the `optimize()` entry point.
//!
//! Purpose
//! -------
//! Drive a [`HyperOptimizer`] for a fixed number of epochs, record one
//! [`EpochRecord`] per epoch, print the per-epoch console line, and hand the
//! finished trajectory to a [`MetricsSink`].
//!
//! Key behaviors
//! -------------
//! - [`TrainingLoop`] is a linear state machine: `Running(0)`, …,
//!   `Running(epochs − 1)`, then `Done`. With zero epochs it starts in
//!   `Done` and never touches the reservoir.
//! - No early stopping, no retries: the first failing epoch ends the run
//!   with its error.
//! - [`optimize`] wires the default task, reservoir and optimizer together
//!   and writes `data.json` and `loss.svg` to the working directory.
//!
//! Invariants & assumptions
//! ------------------------
//! - `metrics.len()` equals the number of completed epochs.
//! - Only the loop mutates the hyperparameters, through its optimizer.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    data::Dataset,
    optimization::{
        hyperparams::HyperparameterSet,
        optimizer::{HyperOptimizer, OptimizerOptions},
    },
    reservoir::{EchoStateReservoir, Reservoir, ReservoirOptions},
    signals::{MultiSine, SignalGenerator},
    training::{
        errors::{TrainError, TrainResult},
        metrics::{EpochRecord, TrainingMetrics},
        plot::write_svg,
        report::format_line,
    },
};

/// TrainOptions — loop length, console reporting and output locations.
///
/// Default
/// -------
/// 50 epochs, verbose, `data.json`, `loss.svg`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    /// Print the per-epoch console line.
    pub verbose: bool,
    pub metrics_path: PathBuf,
    pub plot_path: PathBuf,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 50,
            verbose: true,
            metrics_path: PathBuf::from("data.json"),
            plot_path: PathBuf::from("loss.svg"),
        }
    }
}

/// TaskOptions — the delayed-recall task built from [`MultiSine`].
///
/// Default
/// -------
/// 700 steps, delay 5, 20 identical batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOptions {
    pub steps: usize,
    pub delay: usize,
    pub batches: usize,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self { steps: 700, delay: 5, batches: 20 }
    }
}

impl TaskOptions {
    /// Generate `steps + delay` samples and split them into inputs and
    /// delayed targets.
    pub fn build(&self) -> TrainResult<Dataset> {
        let wave = MultiSine::default().generate(self.steps + self.delay);
        Ok(Dataset::delayed_copy(wave.view(), self.delay, self.batches)?)
    }
}

/// Where the loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// The next epoch to run.
    Running(usize),
    Done,
}

/// Receives the finished trajectory.
pub trait MetricsSink {
    fn export(&mut self, metrics: &TrainingMetrics) -> TrainResult<()>;
}

/// Writes the JSON archive and the SVG plot.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSink {
    metrics_path: PathBuf,
    plot_path: PathBuf,
}

impl FileSink {
    pub fn new(metrics_path: &Path, plot_path: &Path) -> Self {
        Self { metrics_path: metrics_path.to_path_buf(), plot_path: plot_path.to_path_buf() }
    }
}

impl MetricsSink for FileSink {
    fn export(&mut self, metrics: &TrainingMetrics) -> TrainResult<()> {
        metrics.save_json(&self.metrics_path)?;
        write_svg(metrics, &self.plot_path)?;
        info!(
            metrics = %self.metrics_path.display(),
            plot = %self.plot_path.display(),
            epochs = metrics.len(),
            "trajectory exported"
        );
        Ok(())
    }
}

/// TrainingLoop — runs `epochs` optimizer steps over a fixed reservoir and dataset.
#[derive(Debug)]
pub struct TrainingLoop<'a, R: Reservoir> {
    reservoir: &'a R,
    data: &'a Dataset,
    optimizer: HyperOptimizer,
    epochs: usize,
    verbose: bool,
    metrics: TrainingMetrics,
    state: LoopState,
}

impl<'a, R: Reservoir> TrainingLoop<'a, R> {
    pub fn new(
        reservoir: &'a R, data: &'a Dataset, optimizer: HyperOptimizer, options: &TrainOptions,
    ) -> Self {
        let epochs = options.epochs;
        let state = if epochs == 0 { LoopState::Done } else { LoopState::Running(0) };
        Self {
            reservoir,
            data,
            optimizer,
            epochs,
            verbose: options.verbose,
            metrics: TrainingMetrics::with_capacity(epochs),
            state,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn hyperparameters(&self) -> &HyperparameterSet {
        self.optimizer.hyperparameters()
    }

    /// Run one epoch and advance the state.
    ///
    /// # Errors
    /// - [`TrainError::Finished`] in state `Done`.
    /// - [`TrainError::Optimization`] if the optimizer step fails; the state
    ///   does not advance.
    pub fn next_epoch(&mut self) -> TrainResult<EpochRecord> {
        let epoch = match self.state {
            LoopState::Running(epoch) => epoch,
            LoopState::Done => return Err(TrainError::Finished { epochs: self.epochs }),
        };

        let report = self.optimizer.step(self.reservoir, self.data)?;
        let record = EpochRecord::from(&report);
        self.metrics.push(record);
        if self.verbose {
            println!("{}", format_line(&record));
        }

        self.state =
            if epoch + 1 >= self.epochs { LoopState::Done } else { LoopState::Running(epoch + 1) };
        Ok(record)
    }

    /// Run every remaining epoch and return the trajectory.
    pub fn run(mut self) -> TrainResult<TrainingMetrics> {
        info!(epochs = self.epochs, "training started");
        while let LoopState::Running(_) = self.state {
            self.next_epoch()?;
        }
        info!(
            epochs = self.metrics.len(),
            final_loss = self.metrics.last().map(|r| r.loss),
            "training finished"
        );
        Ok(self.metrics)
    }

    /// [`TrainingLoop::run`], then hand the trajectory to `sink`.
    pub fn run_and_export<S: MetricsSink>(self, sink: &mut S) -> TrainResult<TrainingMetrics> {
        let metrics = self.run()?;
        sink.export(&metrics)?;
        Ok(metrics)
    }
}

/// Run the default hyperparameter optimization and write its outputs.
///
/// 50 epochs on a 30-unit seeded reservoir over the sum-of-sines recall
/// task, starting from `ρ = 1, α = 0.5, decay = 0.01, sw = 1`. Writes
/// `data.json` and `loss.svg` to the working directory.
pub fn optimize() -> TrainResult<TrainingMetrics> {
    optimize_with(&TaskOptions::default(), &TrainOptions::default())
}

/// [`optimize`] with a custom task and loop configuration.
pub fn optimize_with(task: &TaskOptions, options: &TrainOptions) -> TrainResult<TrainingMetrics> {
    let data = task.build()?;
    let reservoir = EchoStateReservoir::new(ReservoirOptions::default())?;
    let optimizer = HyperOptimizer::new(HyperparameterSet::default(), OptimizerOptions::default())?;
    let mut sink = FileSink::new(&options.metrics_path, &options.plot_path);
    TrainingLoop::new(&reservoir, &data, optimizer, options).run_and_export(&mut sink)
}
