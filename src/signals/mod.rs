//! signals — deterministic one-dimensional test signals.
//!
//! Purpose
//! -------
//! Produce the scalar waves the delayed-recall task is built from. Every
//! generator is a pure function of its parameters and the requested
//! length: no randomness, no I/O.
//!
//! Key behaviors
//! -------------
//! - [`MultiSine`]: sum of five incommensurate sines, min-max normalized
//!   into `[0, 1]`. This is the default training signal.
//! - [`MackeyGlass`]: Euler-integrated Mackey–Glass delay differential
//!   equation with a constant initial history and a discarded transient.
//! - [`min_max_normalize`]: shared rescaling helper.
//!
//! Downstream usage
//! ----------------
//! - `training::trainer` feeds a generated wave into
//!   [`Dataset::delayed_copy`](crate::data::Dataset::delayed_copy).
use ndarray::Array1;

pub mod mackey_glass;
pub mod sines;

pub use self::mackey_glass::MackeyGlass;
pub use self::sines::MultiSine;

/// A deterministic scalar signal of arbitrary length.
pub trait SignalGenerator {
    /// `len` samples of the signal.
    fn generate(&self, len: usize) -> Array1<f64>;
}

/// Rescale `wave` in place to `[0, 1]`.
///
/// A constant (or empty) wave maps to all zeros.
pub fn min_max_normalize(wave: &mut Array1<f64>) {
    let min = wave.iter().copied().fold(f64::INFINITY, f64::min);
    let max = wave.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        wave.fill(0.0);
        return;
    }
    wave.mapv_inplace(|v| (v - min) / range);
}
