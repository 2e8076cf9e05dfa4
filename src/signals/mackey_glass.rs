//! Mackey–Glass chaotic time series.
//!
//! `ẋ(t) = β·x(t−τ) / (1 + x(t−τ)ⁿ) − γ·x(t)`, integrated with explicit Euler
//! steps of size `dt`. The history before `t = 0` is the constant `3.0`, and
//! the first `2·⌊τ/dt⌋` samples are discarded as transient.
use ndarray::Array1;

use crate::{
    data::{DataError, DataResult},
    signals::SignalGenerator,
};

/// Constant initial history.
const HISTORY: f64 = 3.0;

/// MackeyGlass — parameters of the delay differential equation.
///
/// Default
/// -------
/// `β = 2, γ = 1, n = 9.65, τ = 2, dt = 0.05`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MackeyGlass {
    beta: f64,
    gamma: f64,
    n: f64,
    tau: f64,
    dt: f64,
}

impl MackeyGlass {
    /// # Errors
    /// [`DataError::InvalidGeneratorParam`] unless every parameter is finite
    /// and `> 0`, and `tau >= dt`.
    pub fn new(beta: f64, gamma: f64, n: f64, tau: f64, dt: f64) -> DataResult<Self> {
        for (name, value) in [("beta", beta), ("gamma", gamma), ("n", n), ("tau", tau), ("dt", dt)]
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(DataError::InvalidGeneratorParam { name, value });
            }
        }
        if tau < dt {
            return Err(DataError::InvalidGeneratorParam { name: "tau", value: tau });
        }
        Ok(Self { beta, gamma, n, tau, dt })
    }

    /// Delay in integration steps.
    pub fn delay_steps(&self) -> usize {
        (self.tau / self.dt).floor() as usize
    }
}

impl Default for MackeyGlass {
    fn default() -> Self {
        Self { beta: 2.0, gamma: 1.0, n: 9.65, tau: 2.0, dt: 0.05 }
    }
}

impl SignalGenerator for MackeyGlass {
    fn generate(&self, len: usize) -> Array1<f64> {
        let d = self.delay_steps();
        let total = len + 2 * d;
        let mut x = vec![HISTORY; total.max(1)];
        for t in 0..total.saturating_sub(1) {
            let lagged = if t >= d { x[t - d] } else { HISTORY };
            let production = self.beta * lagged / (1.0 + lagged.powf(self.n));
            x[t + 1] = x[t] + self.dt * (production - self.gamma * x[t]);
        }
        Array1::from_iter(x.into_iter().skip(2 * d).take(len))
    }
}
