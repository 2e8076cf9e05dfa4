//! Sum-of-sines test signal.
use ndarray::Array1;

use crate::signals::{SignalGenerator, min_max_normalize};

/// MultiSine — `Σ sin(f_k · t)` over integer `t`, normalized into `[0, 1]`.
///
/// Default
/// -------
/// Frequencies `1, 0.51, 0.22, 0.1002, 0.05343`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSine {
    pub frequencies: Vec<f64>,
}

impl Default for MultiSine {
    fn default() -> Self {
        Self { frequencies: vec![1.0, 0.51, 0.22, 0.1002, 0.05343] }
    }
}

impl SignalGenerator for MultiSine {
    fn generate(&self, len: usize) -> Array1<f64> {
        let mut wave = Array1::from_shape_fn(len, |t| {
            let t = t as f64;
            self.frequencies.iter().map(|f| (f * t).sin()).sum::<f64>()
        });
        min_max_normalize(&mut wave);
        wave
    }
}
