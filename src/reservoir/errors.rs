//! Errors for reservoir construction and the forward/backward passes.
//!
//! [`ReservoirError`] covers option validation, weight initialization, and
//! shape checks on input sequences and state cotangents. It converts into
//! [`OptError`](crate::optimization::errors::OptError) so the optimizer layer
//! exposes a single error surface.
//!
//! ## Conventions
//! - **Indices are 0-based** (time steps, units).
//! - Shapes are reported as `(rows, cols)`, rows being time steps.

/// Result alias for reservoir operations that may produce [`ReservoirError`].
pub type ReservoirResult<T> = Result<T, ReservoirError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ReservoirError {
    // ---- Options ----
    /// Reservoir must have at least one unit.
    InvalidUnits { units: usize },

    /// Input dimension must be at least one.
    InvalidInputSize { input_size: usize },

    /// Connection probability must lie in (0, 1].
    InvalidConnectivity { value: f64, reason: &'static str },

    // ---- Initialization ----
    /// Recurrent matrix has a (numerically) zero spectral radius and cannot
    /// be rescaled.
    DegenerateSpectralRadius { radius: f64 },

    // ---- Forward / backward ----
    /// Input sequence has no time steps.
    EmptySequence,

    /// Input column count does not match the reservoir input size.
    InputDimMismatch { expected: usize, found: usize },

    /// State cotangent passed to `backward` does not match the recorded states.
    CotangentShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// A hyperparameter reached the forward pass outside its valid interval.
    OutOfDomain { name: &'static str, value: f64, lower: f64, upper: f64 },

    /// A reservoir state became NaN/±inf.
    NonFiniteState { step: usize, unit: usize, value: f64 },
}

impl std::error::Error for ReservoirError {}

impl std::fmt::Display for ReservoirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Options ----
            ReservoirError::InvalidUnits { units } => {
                write!(f, "Invalid number of reservoir units {units}: must be at least 1")
            }
            ReservoirError::InvalidInputSize { input_size } => {
                write!(f, "Invalid input size {input_size}: must be at least 1")
            }
            ReservoirError::InvalidConnectivity { value, reason } => {
                write!(f, "Invalid connectivity {value}: {reason}")
            }

            // ---- Initialization ----
            ReservoirError::DegenerateSpectralRadius { radius } => {
                write!(f, "Recurrent weights have degenerate spectral radius {radius}")
            }

            // ---- Forward / backward ----
            ReservoirError::EmptySequence => {
                write!(f, "Input sequence must contain at least one time step")
            }
            ReservoirError::InputDimMismatch { expected, found } => {
                write!(f, "Input dimension mismatch: expected {expected}, found {found}")
            }
            ReservoirError::CotangentShapeMismatch { expected, found } => {
                write!(f, "State cotangent shape mismatch: expected {expected:?}, found {found:?}")
            }
            ReservoirError::OutOfDomain { name, value, lower, upper } => {
                write!(f, "Hyperparameter {name} = {value} outside [{lower}, {upper}]")
            }
            ReservoirError::NonFiniteState { step, unit, value } => {
                write!(f, "Non-finite reservoir state at step {step}, unit {unit}: {value}")
            }
        }
    }
}
