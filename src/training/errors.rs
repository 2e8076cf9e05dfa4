use crate::{data::DataError, optimization::errors::OptError};

/// Result alias for the training loop and its sinks.
pub type TrainResult<T> = Result<T, TrainError>;

#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    /// An optimizer step failed; the run stops.
    Optimization { source: OptError },

    /// The training data could not be built.
    Data { source: DataError },

    /// Reading or writing an output file failed.
    Io { path: String, reason: String },

    /// The metrics archive could not be encoded or decoded.
    Serialization { reason: String },

    /// The diagnostic plot could not be rendered.
    Plot { reason: String },

    /// The loop was asked for an epoch after it finished.
    Finished { epochs: usize },
}

impl std::error::Error for TrainError {}

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainError::Optimization { source } => write!(f, "Optimization failed: {source}"),
            TrainError::Data { source } => write!(f, "Invalid training data: {source}"),
            TrainError::Io { path, reason } => write!(f, "I/O error on {path}: {reason}"),
            TrainError::Serialization { reason } => {
                write!(f, "Metrics archive serialization failed: {reason}")
            }
            TrainError::Plot { reason } => write!(f, "Plot rendering failed: {reason}"),
            TrainError::Finished { epochs } => {
                write!(f, "Training loop already finished after {epochs} epochs")
            }
        }
    }
}

impl From<OptError> for TrainError {
    fn from(source: OptError) -> Self {
        TrainError::Optimization { source }
    }
}

impl From<DataError> for TrainError {
    fn from(source: DataError) -> Self {
        TrainError::Data { source }
    }
}

impl From<crate::reservoir::ReservoirError> for TrainError {
    fn from(err: crate::reservoir::ReservoirError) -> Self {
        TrainError::Optimization { source: err.into() }
    }
}

impl From<serde_json::Error> for TrainError {
    fn from(err: serde_json::Error) -> Self {
        TrainError::Serialization { reason: err.to_string() }
    }
}
