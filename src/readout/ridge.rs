//! readout::ridge — closed-form ridge regression and its reverse-mode pass.
//!
//! Purpose
//! -------
//! Solve `W = (XᵀX + λI)⁻¹ XᵀY` for a state matrix `X` and target matrix
//! `Y`, evaluate the mean squared error of `XW` against `Y`, and propagate
//! that error back to `X` so gradients can continue into the reservoir.
//!
//! Key behaviors
//! -------------
//! - [`RidgeReadout::solve`] validates shapes and `λ`, checks conditioning
//!   of `XᵀX + λI` through a symmetric eigendecomposition, and factors it
//!   with Cholesky.
//! - [`readout_loss`] runs solve → predict → MSE and returns `∂L/∂X`,
//!   differentiating through the linear solve.
//! - [`mse`] is the plain loss used everywhere a scalar error is reported.
//!
//! Invariants & assumptions
//! ------------------------
//! - `λ` must be finite and `>= 0`. `λ = 0` is ordinary least squares and is
//!   only accepted when `XᵀX` itself is well conditioned.
//! - A system with `min_eigen <= RCOND_MIN · max_eigen` (or non-finite
//!   eigenvalues) is reported as [`OptError::NumericalInstability`]; no
//!   NaN-filled weights are ever returned.
//! - Weights are recomputed from scratch on every call.
//!
//! Conventions
//! -----------
//! - `X` is `(rows × units)`, `Y` is `(rows × outputs)`, `W` is
//!   `(units × outputs)`.
//! - Loss is averaged over all `rows · outputs` entries.
//! - Linear algebra runs on `nalgebra::DMatrix`; the public surface is
//!   `ndarray`.
//!
//! Reverse-mode pass
//! -----------------
//! With `A = XᵀX + λI`, `G = ∂L/∂Ŷ = 2(XW − Y)/n` and `Z = A⁻¹XᵀG`:
//! `∂L/∂X = G Wᵀ − X(Z Wᵀ + W Zᵀ) + Y Zᵀ`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the normal equations, convergence to OLS as `λ → 0`,
//!   shrinkage of `‖W‖` as `λ` grows, rejection of singular systems, loss
//!   non-negativity, and `∂L/∂X` against central finite differences.
use nalgebra::{Cholesky, DMatrix, Dyn};
use ndarray::{Array2, ArrayView2};

use crate::optimization::errors::{OptError, OptResult};

/// Smallest accepted ratio `min_eigen / max_eigen` of `XᵀX + λI`.
pub const RCOND_MIN: f64 = 1e-12;

/// Stateless ridge-regression solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct RidgeReadout;

/// Readout weights together with the factorization that produced them.
#[derive(Debug, Clone)]
pub struct RidgeSolution {
    weights: Array2<f64>,
    factor: Cholesky<f64, Dyn>,
}

/// Output of [`readout_loss`].
#[derive(Debug, Clone)]
pub struct ReadoutLoss {
    pub loss: f64,
    pub weights: Array2<f64>,
    pub d_states: Array2<f64>,
}

impl RidgeReadout {
    /// Solve `(XᵀX + λI) W = XᵀY`.
    ///
    /// # Errors
    /// - [`OptError::InvalidRidgePenalty`] for negative or non-finite `λ`.
    /// - [`OptError::ShapeMismatch`] if `X` and `Y` row counts differ.
    /// - [`OptError::EmptyStates`] if `X` has no rows or no columns.
    /// - [`OptError::NumericalInstability`] if the system is singular or
    ///   too ill-conditioned to factor.
    pub fn solve(
        x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, lambda: f64,
    ) -> OptResult<RidgeSolution> {
        verify_ridge_penalty(lambda)?;
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(OptError::EmptyStates { rows: x.nrows(), washout: 0 });
        }
        if y.nrows() != x.nrows() {
            return Err(OptError::ShapeMismatch {
                what: "readout targets (rows)",
                expected: x.nrows(),
                found: y.nrows(),
            });
        }

        let xd = to_dmatrix(x);
        let yd = to_dmatrix(y);
        let xt = xd.transpose();
        let mut gram = &xt * &xd;
        for i in 0..gram.nrows() {
            gram[(i, i)] += lambda;
        }
        check_conditioning(&gram)?;

        let factor = Cholesky::new(gram).ok_or(OptError::NumericalInstability {
            min_eigen: f64::NAN,
            max_eigen: f64::NAN,
            reason: "Cholesky factorization failed.",
        })?;
        let weights = factor.solve(&(&xt * &yd));
        let weights = to_array2(&weights);
        if weights.iter().any(|v| !v.is_finite()) {
            return Err(OptError::NumericalInstability {
                min_eigen: f64::NAN,
                max_eigen: f64::NAN,
                reason: "Solve produced non-finite weights.",
            });
        }
        Ok(RidgeSolution { weights, factor })
    }
}

impl RidgeSolution {
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn into_weights(self) -> Array2<f64> {
        self.weights
    }

    /// `Ŷ = X W`.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        x.dot(&self.weights)
    }

    /// `(XᵀX + λI)⁻¹ rhs` using the stored factorization.
    fn solve_system(&self, rhs: &Array2<f64>) -> Array2<f64> {
        to_array2(&self.factor.solve(&to_dmatrix(rhs.view())))
    }
}

/// Mean squared error over all entries. Zero iff `pred == target` element-wise.
pub fn mse(pred: ArrayView2<'_, f64>, target: ArrayView2<'_, f64>) -> f64 {
    let n = pred.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = pred.iter().zip(target.iter()).map(|(p, t)| (p - t) * (p - t)).sum();
    sum / n as f64
}

/// readout_loss — fit the ridge readout, score it, and differentiate.
///
/// Parameters
/// ----------
/// - `x`: `(rows × units)` states.
/// - `y`: `(rows × outputs)` targets.
/// - `lambda`: ridge penalty, `>= 0`.
///
/// Returns
/// -------
/// [`ReadoutLoss`] with the MSE, the fitted weights, and `∂L/∂X`.
///
/// Errors
/// ------
/// Everything [`RidgeReadout::solve`] reports.
pub fn readout_loss(
    x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, lambda: f64,
) -> OptResult<ReadoutLoss> {
    let solution = RidgeReadout::solve(x, y, lambda)?;
    let pred = solution.predict(x);
    let loss = mse(pred.view(), y);

    let n = pred.len() as f64;
    let g = (&pred - &y) * (2.0 / n);
    let w = solution.weights();
    let z = solution.solve_system(&x.t().dot(&g));
    let zw = z.dot(&w.t());
    let sym = &zw + &zw.t();
    let d_states = g.dot(&w.t()) - x.dot(&sym) + y.dot(&z.t());

    Ok(ReadoutLoss { loss, weights: solution.into_weights(), d_states })
}

/// Validate the ridge penalty `λ`.
///
/// # Errors
/// [`OptError::InvalidRidgePenalty`] if `λ` is non-finite or negative.
pub fn verify_ridge_penalty(lambda: f64) -> OptResult<()> {
    if !lambda.is_finite() {
        return Err(OptError::InvalidRidgePenalty {
            value: lambda,
            reason: "Ridge penalty must be finite.",
        });
    }
    if lambda < 0.0 {
        return Err(OptError::InvalidRidgePenalty {
            value: lambda,
            reason: "Ridge penalty must be non-negative.",
        });
    }
    Ok(())
}

// ---- Helper methods ----

fn check_conditioning(gram: &DMatrix<f64>) -> OptResult<()> {
    let eigen = gram.clone().symmetric_eigen();
    let min_eigen = eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    let max_eigen = eigen.eigenvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min_eigen.is_finite() || !max_eigen.is_finite() {
        return Err(OptError::NumericalInstability {
            min_eigen,
            max_eigen,
            reason: "Normal-equation matrix has non-finite eigenvalues.",
        });
    }
    if max_eigen <= 0.0 || min_eigen <= RCOND_MIN * max_eigen {
        return Err(OptError::NumericalInstability {
            min_eigen,
            max_eigen,
            reason: "Normal-equation matrix is singular or ill-conditioned.",
        });
    }
    Ok(())
}

fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::<f64>::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use finitediff::FiniteDiff;
    use ndarray::{Array1, Array2};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-1.0..1.0))
    }

    fn frobenius(a: &Array2<f64>) -> f64 {
        a.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    #[test]
    // Purpose
    // -------
    // The returned weights must satisfy the regularized normal equations.
    //
    // Given
    // -----
    // - Random X (40 × 6), Y (40 × 2), λ = 0.3.
    //
    // Expect
    // ------
    // - `(XᵀX + λI) W ≈ XᵀY` entry-wise within 1e-10.
    fn solve_satisfies_normal_equations() {
        // Arrange
        let x = random_matrix(40, 6, 1);
        let y = random_matrix(40, 2, 2);
        let lambda = 0.3;

        // Act
        let w = RidgeReadout::solve(x.view(), y.view(), lambda).unwrap().into_weights();

        // Assert
        let lhs = x.t().dot(&x).dot(&w) + &w * lambda;
        let rhs = x.t().dot(&y);
        for (l, r) in lhs.iter().zip(rhs.iter()) {
            assert_relative_eq!(*l, *r, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // As λ → 0 with full column rank, ridge converges to ordinary least
    // squares.
    //
    // Given
    // -----
    // - Random full-rank X (50 × 3) and exact targets Y = X · W_true.
    //
    // Expect
    // ------
    // - λ = 0 recovers W_true; λ = 1e-9 is within 1e-7 of it, and the error
    //   shrinks as λ decreases.
    fn solve_converges_to_ols_as_lambda_vanishes() {
        // Arrange
        let x = random_matrix(50, 3, 3);
        let w_true = Array2::from_shape_vec((3, 1), vec![0.5, -1.25, 2.0]).unwrap();
        let y = x.dot(&w_true);

        // Act
        let ols = RidgeReadout::solve(x.view(), y.view(), 0.0).unwrap().into_weights();
        let errors: Vec<f64> = [1e-1, 1e-3, 1e-6, 1e-9]
            .iter()
            .map(|&l| {
                let w = RidgeReadout::solve(x.view(), y.view(), l).unwrap().into_weights();
                frobenius(&(&w - &w_true))
            })
            .collect();

        // Assert
        assert!(frobenius(&(&ols - &w_true)) < 1e-10);
        assert!(errors.windows(2).all(|p| p[1] <= p[0]));
        assert!(errors[3] < 1e-7);
    }

    #[test]
    // Purpose
    // -------
    // Regularization shrinkage: ‖W‖ must not increase as λ grows.
    //
    // Given
    // -----
    // - Random X (30 × 8), Y (30 × 2) and an increasing λ sequence.
    //
    // Expect
    // ------
    // - The Frobenius norms form a non-increasing sequence.
    fn weight_norm_is_non_increasing_in_lambda() {
        // Arrange
        let x = random_matrix(30, 8, 4);
        let y = random_matrix(30, 2, 5);
        let lambdas = [1e-4, 1e-3, 1e-2, 0.1, 1.0, 10.0, 100.0, 1e4];

        // Act
        let norms: Vec<f64> = lambdas
            .iter()
            .map(|&l| frobenius(RidgeReadout::solve(x.view(), y.view(), l).unwrap().weights()))
            .collect();

        // Assert
        for pair in norms.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12, "norm increased: {pair:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // A singular system with λ = 0 must fail fast instead of returning NaNs.
    //
    // Given
    // -----
    // - X whose third column duplicates its first; λ = 0.
    //
    // Expect
    // ------
    // - `OptError::NumericalInstability`.
    fn singular_system_reports_numerical_instability() {
        // Arrange
        let mut x = random_matrix(20, 3, 6);
        let first = x.column(0).to_owned();
        x.column_mut(2).assign(&first);
        let y = random_matrix(20, 1, 7);

        // Act
        let err = RidgeReadout::solve(x.view(), y.view(), 0.0).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::NumericalInstability { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A strictly positive λ makes even a rank-deficient (U > T) problem
    // solvable.
    //
    // Given
    // -----
    // - X (5 × 12), Y (5 × 1), λ = 0.02.
    //
    // Expect
    // ------
    // - A finite 12 × 1 weight matrix.
    fn positive_lambda_handles_more_units_than_rows() {
        // Arrange
        let x = random_matrix(5, 12, 8);
        let y = random_matrix(5, 1, 9);

        // Act
        let w = RidgeReadout::solve(x.view(), y.view(), 0.02).unwrap().into_weights();

        // Assert
        assert_eq!(w.dim(), (12, 1));
        assert!(w.iter().all(|v| v.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Ensure invalid penalties and mismatched shapes are rejected.
    //
    // Given
    // -----
    // - λ = −1, λ = NaN, and Y with one row fewer than X.
    //
    // Expect
    // ------
    // - `InvalidRidgePenalty` twice, then `ShapeMismatch`.
    fn solve_rejects_bad_penalty_and_shapes() {
        // Arrange
        let x = random_matrix(10, 2, 10);
        let y = random_matrix(10, 1, 11);
        let short = random_matrix(9, 1, 12);

        // Act / Assert
        assert!(matches!(
            RidgeReadout::solve(x.view(), y.view(), -1.0),
            Err(OptError::InvalidRidgePenalty { .. })
        ));
        assert!(matches!(
            RidgeReadout::solve(x.view(), y.view(), f64::NAN),
            Err(OptError::InvalidRidgePenalty { .. })
        ));
        assert_eq!(
            RidgeReadout::solve(x.view(), short.view(), 0.1).unwrap_err(),
            OptError::ShapeMismatch { what: "readout targets (rows)", expected: 10, found: 9 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Loss is non-negative and zero exactly when predictions equal targets.
    //
    // Given
    // -----
    // - A matrix compared with itself and with a one-entry perturbation.
    //
    // Expect
    // ------
    // - `mse(a, a) == 0.0`; `mse(a, b) > 0.0`.
    fn mse_is_zero_iff_equal() {
        // Arrange
        let a = random_matrix(6, 2, 13);
        let mut b = a.clone();
        b[[3, 1]] += 1e-3;

        // Act / Assert
        assert_eq!(mse(a.view(), a.view()), 0.0);
        assert!(mse(a.view(), b.view()) > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Check ∂L/∂X through the matrix solve against central finite
    // differences.
    //
    // Given
    // -----
    // - Random X (12 × 4), Y (12 × 2), λ = 0.05.
    //
    // Expect
    // ------
    // - Analytic and finite-difference gradients agree within 1e-6.
    fn state_gradient_matches_finite_differences() {
        // Arrange
        let x = random_matrix(12, 4, 14);
        let y = random_matrix(12, 2, 15);
        let lambda = 0.05;
        let flat = Array1::from(x.iter().copied().collect::<Vec<f64>>());
        let loss_of = |v: &Array1<f64>| -> f64 {
            let xm = Array2::from_shape_vec((12, 4), v.to_vec()).unwrap();
            readout_loss(xm.view(), y.view(), lambda).unwrap().loss
        };

        // Act
        let analytic = readout_loss(x.view(), y.view(), lambda).unwrap();
        let numeric = flat.central_diff(&loss_of);

        // Assert
        assert!(analytic.loss >= 0.0);
        for (a, n) in analytic.d_states.iter().zip(numeric.iter()) {
            assert_relative_eq!(*a, *n, epsilon = 1e-6);
        }
    }
}
