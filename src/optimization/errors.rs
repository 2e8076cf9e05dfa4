use argmin::core::{ArgminError, Error};

use crate::reservoir::errors::ReservoirError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Readout ----
    /// `XᵀX + λI` is not safely invertible.
    NumericalInstability { min_eigen: f64, max_eigen: f64, reason: &'static str },

    /// Ridge penalty must be finite and non-negative.
    InvalidRidgePenalty { value: f64, reason: &'static str },

    /// State and target matrices disagree on a dimension.
    ShapeMismatch { what: &'static str, expected: usize, found: usize },

    /// No state rows are left to fit the readout on (e.g. washout too long).
    EmptyStates { rows: usize, washout: usize },

    // ---- Hyperparameters ----
    /// A hyperparameter reached the forward pass outside its valid interval.
    OutOfDomainHyperparameter { name: &'static str, value: f64, lower: f64, upper: f64 },

    /// Box bounds must be finite with `lower <= upper`.
    InvalidBounds { lower: f64, upper: f64, reason: &'static str },

    /// Hyperparameter vector must have exactly four entries.
    HyperparameterLengthMismatch { expected: usize, found: usize },

    // ---- Gradient / loss ----
    /// A gradient entry is NaN/±inf.
    NonFiniteGradient { name: &'static str, value: f64 },

    /// Loss is NaN/±inf.
    NonFiniteLoss { value: f64 },

    // ---- Adam options ----
    /// Learning rate must be finite and > 0.
    InvalidLearningRate { value: f64, reason: &'static str },

    /// Moment decay rates must lie in [0, 1).
    InvalidMomentDecay { which: &'static str, value: f64 },

    /// Denominator epsilon must be finite and > 0.
    InvalidEpsilon { value: f64 },

    // ---- Reservoir ----
    /// Forwarded from the reservoir layer.
    Reservoir { source: ReservoirError },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Readout ----
            OptError::NumericalInstability { min_eigen, max_eigen, reason } => {
                write!(
                    f,
                    "Numerical instability in ridge readout (eigenvalues in [{min_eigen}, {max_eigen}]): {reason}"
                )
            }
            OptError::InvalidRidgePenalty { value, reason } => {
                write!(f, "Invalid ridge penalty {value}: {reason}")
            }
            OptError::ShapeMismatch { what, expected, found } => {
                write!(f, "Shape mismatch in {what}: expected {expected}, found {found}")
            }
            OptError::EmptyStates { rows, washout } => {
                write!(f, "No state rows left for the readout: {rows} rows, washout {washout}")
            }

            // ---- Hyperparameters ----
            OptError::OutOfDomainHyperparameter { name, value, lower, upper } => {
                write!(f, "Hyperparameter {name} = {value} outside its domain [{lower}, {upper}]")
            }
            OptError::InvalidBounds { lower, upper, reason } => {
                write!(f, "Invalid bounds [{lower}, {upper}]: {reason}")
            }
            OptError::HyperparameterLengthMismatch { expected, found } => {
                write!(f, "Hyperparameter vector length mismatch: expected {expected}, found {found}")
            }

            // ---- Gradient / loss ----
            OptError::NonFiniteGradient { name, value } => {
                write!(f, "Non-finite gradient for {name}: {value}")
            }
            OptError::NonFiniteLoss { value } => {
                write!(f, "Non-finite loss value: {value}")
            }

            // ---- Adam options ----
            OptError::InvalidLearningRate { value, reason } => {
                write!(f, "Invalid learning rate {value}: {reason}")
            }
            OptError::InvalidMomentDecay { which, value } => {
                write!(f, "Invalid moment decay {which} = {value}, must lie in [0, 1)")
            }
            OptError::InvalidEpsilon { value } => {
                write!(f, "Invalid epsilon {value}, must be finite and > 0")
            }

            // ---- Reservoir ----
            OptError::Reservoir { source } => {
                write!(f, "Reservoir error: {source}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Our own errors travel through argmin boxed; unwrap them first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<ReservoirError> for OptError {
    fn from(err: ReservoirError) -> Self {
        match err {
            ReservoirError::OutOfDomain { name, value, lower, upper } => {
                OptError::OutOfDomainHyperparameter { name, value, lower, upper }
            }
            other => OptError::Reservoir { source: other },
        }
    }
}
