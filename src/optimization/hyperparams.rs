//! optimization::hyperparams — trainable reservoir hyperparameters and their box constraints.
//!
//! Purpose
//! -------
//! Define the four continuous hyperparameters tuned by the optimizer
//! (spectral radius ρ, leak rate α, decay, input scale sw), their valid
//! intervals, and the projection that restores those intervals after an
//! unconstrained gradient step.
//!
//! Key behaviors
//! -------------
//! - [`Hyperparameter`] names each scalar and carries its declared
//!   [`Bounds`].
//! - [`HyperparameterSet`] stores the live values, converts to/from the
//!   canonical `Array1<f64>` layout `[ρ, α, decay, sw]`, and projects itself
//!   back into the box by clamping.
//! - [`HyperparameterSet::check_domain`] reports the first value outside its
//!   interval as [`OptError::OutOfDomainHyperparameter`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Bounds are closed intervals with finite `lower <= upper`.
//! - After [`HyperparameterSet::project`] every value lies in its interval;
//!   NaN inputs are *not* repaired by projection and are rejected upstream
//!   by gradient/loss validation.
//!
//! Conventions
//! -----------
//! - Vector layout is always [`Hyperparameter::ALL`] order: `ρ, α, decay, sw`.
//!   Console output uses a different order (`alpha, decay, rho, sw`); that
//!   mapping lives in `training::report`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover clamp idempotence, projection onto every bound, vector
//!   round trips, and domain checks.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::optimization::errors::{OptError, OptResult};

/// Closed interval `[lower, upper]` used as a box constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    /// Construct validated bounds.
    ///
    /// # Errors
    /// [`OptError::InvalidBounds`] if either end is non-finite or `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> OptResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(OptError::InvalidBounds { lower, upper, reason: "Bounds must be finite." });
        }
        if lower > upper {
            return Err(OptError::InvalidBounds {
                lower,
                upper,
                reason: "Lower bound must not exceed upper bound.",
            });
        }
        Ok(Self { lower, upper })
    }

    /// Clamp `value` into the interval. NaN passes through unchanged.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// One of the four trainable reservoir hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hyperparameter {
    SpectralRadius,
    LeakRate,
    Decay,
    InputScale,
}

impl Hyperparameter {
    /// Canonical vector order.
    pub const ALL: [Hyperparameter; 4] = [
        Hyperparameter::SpectralRadius,
        Hyperparameter::LeakRate,
        Hyperparameter::Decay,
        Hyperparameter::InputScale,
    ];

    /// Short name used in logs, errors, and the console report.
    pub fn name(self) -> &'static str {
        match self {
            Hyperparameter::SpectralRadius => "rho",
            Hyperparameter::LeakRate => "alpha",
            Hyperparameter::Decay => "decay",
            Hyperparameter::InputScale => "sw",
        }
    }

    /// Declared valid interval.
    pub fn bounds(self) -> Bounds {
        match self {
            Hyperparameter::SpectralRadius => Bounds { lower: 0.5, upper: 50.0 },
            Hyperparameter::LeakRate => Bounds { lower: 0.05, upper: 0.95 },
            Hyperparameter::Decay => Bounds { lower: 0.0001, upper: 0.25 },
            Hyperparameter::InputScale => Bounds { lower: 0.5, upper: 50.0 },
        }
    }

    /// Position in the canonical vector layout.
    pub fn index(self) -> usize {
        match self {
            Hyperparameter::SpectralRadius => 0,
            Hyperparameter::LeakRate => 1,
            Hyperparameter::Decay => 2,
            Hyperparameter::InputScale => 3,
        }
    }
}

/// HyperparameterSet — the live values of ρ, α, decay and sw.
///
/// Fields
/// ------
/// - `rho`: spectral radius of the recurrent weights, `[0.5, 50.0]`.
/// - `alpha`: leak rate, `[0.05, 0.95]`.
/// - `decay`: state forgetting rate, `[0.0001, 0.25]`.
/// - `sw`: input scale, `[0.5, 50.0]`.
///
/// Default
/// -------
/// `ρ = 1.0, α = 0.5, decay = 0.01, sw = 1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterSet {
    pub rho: f64,
    pub alpha: f64,
    pub decay: f64,
    pub sw: f64,
}

impl Default for HyperparameterSet {
    fn default() -> Self {
        Self { rho: 1.0, alpha: 0.5, decay: 0.01, sw: 1.0 }
    }
}

impl HyperparameterSet {
    pub fn new(rho: f64, alpha: f64, decay: f64, sw: f64) -> Self {
        Self { rho, alpha, decay, sw }
    }

    pub fn get(&self, which: Hyperparameter) -> f64 {
        match which {
            Hyperparameter::SpectralRadius => self.rho,
            Hyperparameter::LeakRate => self.alpha,
            Hyperparameter::Decay => self.decay,
            Hyperparameter::InputScale => self.sw,
        }
    }

    pub fn set(&mut self, which: Hyperparameter, value: f64) {
        match which {
            Hyperparameter::SpectralRadius => self.rho = value,
            Hyperparameter::LeakRate => self.alpha = value,
            Hyperparameter::Decay => self.decay = value,
            Hyperparameter::InputScale => self.sw = value,
        }
    }

    /// Values in canonical order `[ρ, α, decay, sw]`.
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(vec![self.rho, self.alpha, self.decay, self.sw])
    }

    /// Build from a canonical-order vector.
    ///
    /// # Errors
    /// [`OptError::HyperparameterLengthMismatch`] unless `values.len() == 4`.
    pub fn from_array(values: &Array1<f64>) -> OptResult<Self> {
        if values.len() != Hyperparameter::ALL.len() {
            return Err(OptError::HyperparameterLengthMismatch {
                expected: Hyperparameter::ALL.len(),
                found: values.len(),
            });
        }
        Ok(Self { rho: values[0], alpha: values[1], decay: values[2], sw: values[3] })
    }

    /// Clamp every value into its declared interval.
    ///
    /// Returns the hyperparameters that were actually moved, so callers can
    /// log when the box was active.
    pub fn project(&mut self) -> Vec<Hyperparameter> {
        let mut clipped = Vec::new();
        for which in Hyperparameter::ALL {
            let value = self.get(which);
            let projected = which.bounds().clamp(value);
            if projected != value {
                self.set(which, projected);
                clipped.push(which);
            }
        }
        clipped
    }

    /// Projected copy; `self` is left untouched.
    pub fn projected(&self) -> Self {
        let mut out = *self;
        out.project();
        out
    }

    /// Ensure every value lies inside its declared interval.
    ///
    /// # Errors
    /// [`OptError::OutOfDomainHyperparameter`] for the first offending value
    /// in canonical order (NaN counts as out of domain).
    pub fn check_domain(&self) -> OptResult<()> {
        for which in Hyperparameter::ALL {
            let value = self.get(which);
            let bounds = which.bounds();
            if !bounds.contains(value) {
                return Err(OptError::OutOfDomainHyperparameter {
                    name: which.name(),
                    value,
                    lower: bounds.lower,
                    upper: bounds.upper,
                });
            }
        }
        Ok(())
    }
}
