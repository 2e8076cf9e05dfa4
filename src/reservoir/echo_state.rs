//! reservoir::echo_state — leaky tanh echo-state reservoir with a reverse-mode pass.
//!
//! Purpose
//! -------
//! Provide the concrete [`Reservoir`] used by the training loop: fixed,
//! seeded random weights and a four-hyperparameter leaky recurrence whose
//! gradient is obtained by backpropagation through time.
//!
//! Key behaviors
//! -------------
//! - Draw the recurrent matrix `W` (sparsified by `connectivity`) and the
//!   input matrix `W_in` from a `ChaCha8Rng` seeded with
//!   [`ReservoirOptions::seed`], then rescale `W` to unit spectral radius so
//!   that `ρ` is the effective spectral radius.
//! - Run, for each time step with `x₋₁ = 0`:
//!   - `a_t = ρ·W·x_{t-1} + sw·W_in·s_t`
//!   - `h_t = tanh(a_t)`
//!   - `x_t = (1 − decay)·((1 − α)·x_{t-1} + α·h_t)`
//! - Record `W_in·s_t`, `W·x_{t-1}`, `h_t` and `x_t` on an
//!   [`EchoStateTape`] and replay them backwards in
//!   [`Reservoir::backward`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Weights never change after construction.
//! - The forward pass refuses hyperparameters outside their declared
//!   intervals.
//! - `|h_t| <= 1` and `0 < 1 − decay <= 1`, so states stay bounded for every
//!   in-domain hyperparameter set.
//!
//! Performance
//! -----------
//! - Forward and backward are both `O(T · units²)`; the tape stores four
//!   `T × units` matrices.
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    optimization::hyperparams::{Hyperparameter, HyperparameterSet},
    reservoir::{
        HyperGradient, Reservoir,
        errors::{ReservoirError, ReservoirResult},
        options::ReservoirOptions,
    },
};

/// Spectral radii at or below this value are treated as zero.
pub const RADIUS_EPS: f64 = 1e-12;

/// EchoStateReservoir — fixed random weights plus the leaky tanh recurrence.
///
/// Fields
/// ------
/// - `w`: `units × units` recurrent matrix with unit spectral radius.
/// - `w_in`: `units × input_size` input matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EchoStateReservoir {
    w: Array2<f64>,
    w_in: Array2<f64>,
}

/// Recording of one forward pass, consumed by [`Reservoir::backward`].
#[derive(Debug, Clone)]
pub struct EchoStateTape {
    drive: Array2<f64>,
    recurrent: Array2<f64>,
    activations: Array2<f64>,
    states: Array2<f64>,
    hp: HyperparameterSet,
}

impl EchoStateReservoir {
    /// Draw seeded weights and normalize `W` to unit spectral radius.
    ///
    /// # Errors
    /// - Anything [`ReservoirOptions::validate`] reports.
    /// - [`ReservoirError::DegenerateSpectralRadius`] when the sampled `W` has
    ///   (numerically) no nonzero eigenvalue, e.g. a very sparse draw.
    pub fn new(options: ReservoirOptions) -> ReservoirResult<Self> {
        options.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let units = options.units;

        let mut w = Array2::<f64>::zeros((units, units));
        for v in w.iter_mut() {
            if rng.gen_bool(options.connectivity) {
                *v = rng.gen_range(-1.0..1.0);
            }
        }
        let radius = spectral_radius(&w);
        if !radius.is_finite() || radius <= RADIUS_EPS {
            return Err(ReservoirError::DegenerateSpectralRadius { radius });
        }
        w.mapv_inplace(|v| v / radius);

        let w_in =
            Array2::from_shape_fn((units, options.input_size), |_| rng.gen_range(-1.0..1.0));

        tracing::debug!(units, input_size = options.input_size, radius, "built echo-state weights");
        Ok(Self { w, w_in })
    }

    /// Use the given weights as-is (no spectral normalization).
    ///
    /// # Errors
    /// - [`ReservoirError::InvalidUnits`] if `w` is empty or not square.
    /// - [`ReservoirError::InputDimMismatch`] if `w_in` has a different row
    ///   count than `w`.
    /// - [`ReservoirError::InvalidInputSize`] if `w_in` has no columns.
    pub fn from_weights(w: Array2<f64>, w_in: Array2<f64>) -> ReservoirResult<Self> {
        if w.nrows() == 0 || w.nrows() != w.ncols() {
            return Err(ReservoirError::InvalidUnits { units: w.nrows() });
        }
        if w_in.nrows() != w.nrows() {
            return Err(ReservoirError::InputDimMismatch {
                expected: w.nrows(),
                found: w_in.nrows(),
            });
        }
        if w_in.ncols() == 0 {
            return Err(ReservoirError::InvalidInputSize { input_size: 0 });
        }
        Ok(Self { w, w_in })
    }

    pub fn recurrent_weights(&self) -> &Array2<f64> {
        &self.w
    }

    pub fn input_weights(&self) -> &Array2<f64> {
        &self.w_in
    }
}

impl Reservoir for EchoStateReservoir {
    type Tape = EchoStateTape;

    fn units(&self) -> usize {
        self.w.nrows()
    }

    fn input_size(&self) -> usize {
        self.w_in.ncols()
    }

    fn forward(
        &self, inputs: ArrayView2<'_, f64>, hp: &HyperparameterSet,
    ) -> ReservoirResult<(Array2<f64>, EchoStateTape)> {
        check_hyperparameters(hp)?;
        let (steps, cols) = inputs.dim();
        if steps == 0 {
            return Err(ReservoirError::EmptySequence);
        }
        if cols != self.input_size() {
            return Err(ReservoirError::InputDimMismatch {
                expected: self.input_size(),
                found: cols,
            });
        }

        let units = self.units();
        let kappa = 1.0 - hp.decay;
        let keep = 1.0 - hp.alpha;
        let drive = inputs.dot(&self.w_in.t());
        let mut recurrent = Array2::<f64>::zeros((steps, units));
        let mut activations = Array2::<f64>::zeros((steps, units));
        let mut states = Array2::<f64>::zeros((steps, units));
        let mut prev = Array1::<f64>::zeros(units);

        for t in 0..steps {
            let rec = self.w.dot(&prev);
            let act = (hp.rho * &rec + hp.sw * &drive.row(t)).mapv(f64::tanh);
            let next = kappa * (keep * &prev + hp.alpha * &act);
            if let Some((unit, &value)) = next.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(ReservoirError::NonFiniteState { step: t, unit, value });
            }
            recurrent.row_mut(t).assign(&rec);
            activations.row_mut(t).assign(&act);
            states.row_mut(t).assign(&next);
            prev = next;
        }

        let tape = EchoStateTape {
            drive,
            recurrent,
            activations,
            states: states.clone(),
            hp: *hp,
        };
        Ok((states, tape))
    }

    fn backward(
        &self, tape: EchoStateTape, d_states: ArrayView2<'_, f64>,
    ) -> ReservoirResult<HyperGradient> {
        let EchoStateTape { drive, recurrent, activations, states, hp } = tape;
        if d_states.dim() != states.dim() {
            return Err(ReservoirError::CotangentShapeMismatch {
                expected: states.dim(),
                found: d_states.dim(),
            });
        }

        let (steps, units) = states.dim();
        let kappa = 1.0 - hp.decay;
        let keep = 1.0 - hp.alpha;
        let zeros = Array1::<f64>::zeros(units);
        let mut carry = Array1::<f64>::zeros(units);
        let mut d_pre = Array1::<f64>::zeros(units);
        let mut grad = HyperGradient::default();

        for t in (0..steps).rev() {
            let delta = &d_states.row(t) + &carry;
            let prev = if t == 0 { zeros.view() } else { states.row(t - 1) };
            let act = activations.row(t);
            for u in 0..units {
                let mixed = keep * prev[u] + hp.alpha * act[u];
                grad.decay -= delta[u] * mixed;
                grad.alpha += kappa * delta[u] * (act[u] - prev[u]);
                d_pre[u] = kappa * hp.alpha * delta[u] * (1.0 - act[u] * act[u]);
                grad.rho += d_pre[u] * recurrent[[t, u]];
                grad.sw += d_pre[u] * drive[[t, u]];
            }
            carry = kappa * keep * &delta + hp.rho * &self.w.t().dot(&d_pre);
        }
        Ok(grad)
    }
}

// ---- Helper methods ----

/// Largest eigenvalue modulus of a square matrix.
pub fn spectral_radius(w: &Array2<f64>) -> f64 {
    let n = w.nrows();
    let dm = DMatrix::<f64>::from_fn(n, n, |i, j| w[[i, j]]);
    dm.complex_eigenvalues().iter().map(|c| c.re.hypot(c.im)).fold(0.0, f64::max)
}

fn check_hyperparameters(hp: &HyperparameterSet) -> ReservoirResult<()> {
    for which in Hyperparameter::ALL {
        let value = hp.get(which);
        let bounds = which.bounds();
        if !bounds.contains(value) {
            return Err(ReservoirError::OutOfDomain {
                name: which.name(),
                value,
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
    }
    Ok(())
}
