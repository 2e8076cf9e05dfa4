//! Validation helpers for the hyperparameter optimizer.
//!
//! This module centralizes the consistency checks used across the
//! optimization layer:
//!
//! - **Option checks**: [`verify_learning_rate`], [`verify_moment_decay`],
//!   [`verify_epsilon`] ensure Adam settings are finite and in range.
//! - **Gradient validation**: [`validate_gradient`] rejects NaN/±inf entries
//!   and names the offending hyperparameter.
//! - **Loss values**: [`validate_loss`] checks the scalar loss for finiteness.
//!
//! There is no recovery path: callers propagate these errors and the run
//! stops.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        hyperparams::Hyperparameter,
    },
    reservoir::HyperGradient,
};

/// Validate the Adam learning rate.
///
/// # Errors
/// Returns [`OptError::InvalidLearningRate`] if the value is non-finite or ≤ 0.0.
pub fn verify_learning_rate(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidLearningRate {
            value,
            reason: "Learning rate must be finite.",
        });
    }
    if value <= 0.0 {
        return Err(OptError::InvalidLearningRate {
            value,
            reason: "Learning rate must be positive.",
        });
    }
    Ok(())
}

/// Validate a moment decay rate (`beta1` or `beta2`), which must lie in `[0, 1)`.
///
/// # Errors
/// Returns [`OptError::InvalidMomentDecay`] otherwise.
pub fn verify_moment_decay(which: &'static str, value: f64) -> OptResult<()> {
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(OptError::InvalidMomentDecay { which, value });
    }
    Ok(())
}

/// Validate the Adam denominator epsilon.
///
/// # Errors
/// Returns [`OptError::InvalidEpsilon`] if the value is non-finite or ≤ 0.0.
pub fn verify_epsilon(value: f64) -> OptResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(OptError::InvalidEpsilon { value });
    }
    Ok(())
}

/// Validate that every gradient entry is finite.
///
/// # Errors
/// [`OptError::NonFiniteGradient`] naming the first offending
/// hyperparameter in canonical order.
pub fn validate_gradient(grad: &HyperGradient) -> OptResult<()> {
    let values = grad.to_array();
    for which in Hyperparameter::ALL {
        let value = values[which.index()];
        if !value.is_finite() {
            return Err(OptError::NonFiniteGradient { name: which.name(), value });
        }
    }
    Ok(())
}

/// Validate that a scalar loss is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteLoss`] if the value is `NaN` or infinite.
pub fn validate_loss(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteLoss { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Ensure a NaN gradient entry is reported with the right name.
    //
    // Given
    // -----
    // - A gradient whose `sw` entry is NaN.
    //
    // Expect
    // ------
    // - `NonFiniteGradient { name: "sw", .. }`.
    fn validate_gradient_names_offending_entry() {
        // Arrange
        let grad = HyperGradient { rho: 0.1, alpha: -0.2, decay: 0.0, sw: f64::NAN };

        // Act
        let err = validate_gradient(&grad).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::NonFiniteGradient { name: "sw", .. }));
    }

    #[test]
    // Purpose
    // -------
    // Check the Adam option guards on both sides of their valid ranges.
    //
    // Given
    // -----
    // - Learning rates 0.0 and NaN, betas 1.0 and −0.1, epsilon 0.0.
    //
    // Expect
    // ------
    // - Each call returns the corresponding error; sane values pass.
    fn option_guards_reject_out_of_range_values() {
        // Act / Assert
        assert!(matches!(verify_learning_rate(0.0), Err(OptError::InvalidLearningRate { .. })));
        assert!(matches!(
            verify_learning_rate(f64::NAN),
            Err(OptError::InvalidLearningRate { .. })
        ));
        assert_eq!(
            verify_moment_decay("beta1", 1.0),
            Err(OptError::InvalidMomentDecay { which: "beta1", value: 1.0 })
        );
        assert!(verify_moment_decay("beta2", -0.1).is_err());
        assert_eq!(verify_epsilon(0.0), Err(OptError::InvalidEpsilon { value: 0.0 }));
        assert!(verify_learning_rate(0.02).is_ok());
        assert!(verify_moment_decay("beta2", 0.999).is_ok());
        assert!(verify_epsilon(1e-7).is_ok());
        assert!(validate_loss(0.0).is_ok());
        assert!(matches!(validate_loss(f64::INFINITY), Err(OptError::NonFiniteLoss { .. })));
    }
}
