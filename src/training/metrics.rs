//! training::metrics — per-epoch trajectory and its JSON archive.
//!
//! The trajectory is stored column-wise (one series per quantity), matching
//! the archive layout `{ "loss": [..], "alpha": [..], "decay": [..],
//! "rho": [..], "sw": [..] }`. All five series always have the same length.
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    optimization::{hyperparams::HyperparameterSet, optimizer::StepReport},
    training::errors::{TrainError, TrainResult},
};

/// One epoch: the loss and the hyperparameters the epoch ended with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub loss: f64,
    pub alpha: f64,
    pub decay: f64,
    pub rho: f64,
    pub sw: f64,
}

impl EpochRecord {
    pub fn new(loss: f64, hp: &HyperparameterSet) -> Self {
        Self { loss, alpha: hp.alpha, decay: hp.decay, rho: hp.rho, sw: hp.sw }
    }

    pub fn hyperparameters(&self) -> HyperparameterSet {
        HyperparameterSet::new(self.rho, self.alpha, self.decay, self.sw)
    }
}

impl From<&StepReport> for EpochRecord {
    fn from(report: &StepReport) -> Self {
        EpochRecord::new(report.loss, &report.hyperparameters)
    }
}

/// TrainingMetrics — append-only trajectory, one entry per completed epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    loss: Vec<f64>,
    alpha: Vec<f64>,
    decay: Vec<f64>,
    rho: Vec<f64>,
    sw: Vec<f64>,
}

impl TrainingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(epochs: usize) -> Self {
        Self {
            loss: Vec::with_capacity(epochs),
            alpha: Vec::with_capacity(epochs),
            decay: Vec::with_capacity(epochs),
            rho: Vec::with_capacity(epochs),
            sw: Vec::with_capacity(epochs),
        }
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.loss.push(record.loss);
        self.alpha.push(record.alpha);
        self.decay.push(record.decay);
        self.rho.push(record.rho);
        self.sw.push(record.sw);
    }

    pub fn len(&self) -> usize {
        self.loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loss.is_empty()
    }

    pub fn get(&self, epoch: usize) -> Option<EpochRecord> {
        Some(EpochRecord {
            loss: *self.loss.get(epoch)?,
            alpha: *self.alpha.get(epoch)?,
            decay: *self.decay.get(epoch)?,
            rho: *self.rho.get(epoch)?,
            sw: *self.sw.get(epoch)?,
        })
    }

    pub fn last(&self) -> Option<EpochRecord> {
        self.len().checked_sub(1).and_then(|epoch| self.get(epoch))
    }

    pub fn records(&self) -> impl Iterator<Item = EpochRecord> + '_ {
        (0..self.len()).filter_map(move |epoch| self.get(epoch))
    }

    pub fn loss(&self) -> &[f64] {
        &self.loss
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn decay(&self) -> &[f64] {
        &self.decay
    }

    pub fn rho(&self) -> &[f64] {
        &self.rho
    }

    pub fn sw(&self) -> &[f64] {
        &self.sw
    }

    /// Write the trajectory as pretty-printed JSON.
    ///
    /// # Errors
    /// [`TrainError::Serialization`] or [`TrainError::Io`].
    pub fn save_json(&self, path: &Path) -> TrainResult<()> {
        let encoded = serde_json::to_string_pretty(self)?;
        fs::write(path, encoded).map_err(|e| io_error(path, e))
    }

    /// Read a trajectory written by [`TrainingMetrics::save_json`].
    ///
    /// # Errors
    /// - [`TrainError::Io`] if the file cannot be read.
    /// - [`TrainError::Serialization`] if it is not a valid archive or the
    ///   series lengths disagree.
    pub fn load_json(path: &Path) -> TrainResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let metrics: TrainingMetrics = serde_json::from_str(&raw)?;
        let n = metrics.loss.len();
        if [&metrics.alpha, &metrics.decay, &metrics.rho, &metrics.sw].iter().any(|s| s.len() != n)
        {
            return Err(TrainError::Serialization {
                reason: "metric series have different lengths".to_string(),
            });
        }
        Ok(metrics)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> TrainError {
    TrainError::Io { path: path.display().to_string(), reason: err.to_string() }
}
