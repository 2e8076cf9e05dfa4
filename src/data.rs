//! data — batched input/target sequences for hyperparameter optimization.
//!
//! Purpose
//! -------
//! Hold the immutable training data handed to the optimizer: `B` batches of
//! equally long input and target sequences.
//!
//! Key behaviors
//! -------------
//! - [`Dataset::new`] validates shapes and finiteness once; the dataset is
//!   read-only afterwards.
//! - [`Dataset::delayed_copy`] builds the delayed-recall task: the target at
//!   step `t` is the input from `delay` steps earlier, replicated over `B`
//!   identical batches.
//!
//! Invariants & assumptions
//! ------------------------
//! - `inputs` is `(B × T × I)`, `targets` is `(B × T × K)`, with `B, T, I, K ≥ 1`.
//! - All entries are finite.
use ndarray::{Array3, ArrayView1, ArrayView2, Axis};

/// Result alias for dataset construction.
pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// A dimension of the data is zero.
    EmptyData { what: &'static str },

    /// Inputs and targets disagree on a leading dimension.
    LengthMismatch { what: &'static str, inputs: usize, targets: usize },

    /// A value is NaN/±inf.
    NonFiniteData { what: &'static str, index: (usize, usize, usize), value: f64 },

    /// Delay leaves no samples.
    DelayTooLong { delay: usize, len: usize },

    /// Generator parameter must be finite and > 0.
    InvalidGeneratorParam { name: &'static str, value: f64 },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptyData { what } => {
                write!(f, "Dataset {what} must be non-empty")
            }
            DataError::LengthMismatch { what, inputs, targets } => {
                write!(f, "Dataset {what} mismatch: inputs {inputs}, targets {targets}")
            }
            DataError::NonFiniteData { what, index, value } => {
                write!(f, "Non-finite {what} value at {index:?}: {value}")
            }
            DataError::DelayTooLong { delay, len } => {
                write!(f, "Delay {delay} leaves no samples in a signal of length {len}")
            }
            DataError::InvalidGeneratorParam { name, value } => {
                write!(f, "Invalid generator parameter {name} = {value}, must be finite and > 0")
            }
        }
    }
}

/// Dataset — `B` batches of input and target sequences of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Array3<f64>,
    targets: Array3<f64>,
}

impl Dataset {
    /// Validate and wrap `(B × T × I)` inputs and `(B × T × K)` targets.
    ///
    /// # Errors
    /// - [`DataError::EmptyData`] if any dimension is zero.
    /// - [`DataError::LengthMismatch`] if batch counts or lengths differ.
    /// - [`DataError::NonFiniteData`] for the first NaN/±inf entry.
    pub fn new(inputs: Array3<f64>, targets: Array3<f64>) -> DataResult<Self> {
        let (b_in, t_in, i_in) = inputs.dim();
        let (b_tg, t_tg, k_tg) = targets.dim();
        if b_in == 0 || b_tg == 0 {
            return Err(DataError::EmptyData { what: "batches" });
        }
        if t_in == 0 || t_tg == 0 {
            return Err(DataError::EmptyData { what: "time steps" });
        }
        if i_in == 0 || k_tg == 0 {
            return Err(DataError::EmptyData { what: "channels" });
        }
        if b_in != b_tg {
            return Err(DataError::LengthMismatch { what: "batches", inputs: b_in, targets: b_tg });
        }
        if t_in != t_tg {
            return Err(DataError::LengthMismatch {
                what: "time steps",
                inputs: t_in,
                targets: t_tg,
            });
        }
        check_finite("input", &inputs)?;
        check_finite("target", &targets)?;
        Ok(Self { inputs, targets })
    }

    /// Delayed-recall task: input `wave[delay..]`, target `wave[..len − delay]`,
    /// replicated over `batches`.
    ///
    /// # Errors
    /// - [`DataError::EmptyData`] if `batches == 0`.
    /// - [`DataError::DelayTooLong`] if `delay >= wave.len()`.
    /// - Anything [`Dataset::new`] reports.
    pub fn delayed_copy(wave: ArrayView1<'_, f64>, delay: usize, batches: usize) -> DataResult<Self> {
        if batches == 0 {
            return Err(DataError::EmptyData { what: "batches" });
        }
        if delay >= wave.len() {
            return Err(DataError::DelayTooLong { delay, len: wave.len() });
        }
        let steps = wave.len() - delay;
        let inputs = Array3::from_shape_fn((batches, steps, 1), |(_, t, _)| wave[t + delay]);
        let targets = Array3::from_shape_fn((batches, steps, 1), |(_, t, _)| wave[t]);
        Self::new(inputs, targets)
    }

    pub fn batches(&self) -> usize {
        self.inputs.len_of(Axis(0))
    }

    pub fn steps(&self) -> usize {
        self.inputs.len_of(Axis(1))
    }

    pub fn input_size(&self) -> usize {
        self.inputs.len_of(Axis(2))
    }

    pub fn output_size(&self) -> usize {
        self.targets.len_of(Axis(2))
    }

    /// `(T × I)` inputs of batch `b`. Panics if `b >= batches()`.
    pub fn input(&self, b: usize) -> ArrayView2<'_, f64> {
        self.inputs.index_axis(Axis(0), b)
    }

    /// `(T × K)` targets of batch `b`. Panics if `b >= batches()`.
    pub fn target(&self, b: usize) -> ArrayView2<'_, f64> {
        self.targets.index_axis(Axis(0), b)
    }
}

fn check_finite(what: &'static str, values: &Array3<f64>) -> DataResult<()> {
    match values.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(DataError::NonFiniteData { what, index, value }),
        None => Ok(()),
    }
}
