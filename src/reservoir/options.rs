//! Construction options for [`EchoStateReservoir`](super::EchoStateReservoir).
use crate::reservoir::errors::{ReservoirError, ReservoirResult};

/// ReservoirOptions — shape and seeding of the fixed reservoir weights.
///
/// Fields
/// ------
/// - `units`: number of recurrent units (`>= 1`).
/// - `input_size`: number of input channels (`>= 1`).
/// - `connectivity`: probability that a recurrent connection is present,
///   in `(0, 1]`.
/// - `seed`: seed for every random draw made during construction.
///
/// Default
/// -------
/// - `units = 30`, `input_size = 1`, `connectivity = 1.0`, `seed = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReservoirOptions {
    pub units: usize,
    pub input_size: usize,
    pub connectivity: f64,
    pub seed: u64,
}

impl ReservoirOptions {
    /// Create validated options.
    ///
    /// # Errors
    /// - [`ReservoirError::InvalidUnits`] if `units == 0`.
    /// - [`ReservoirError::InvalidInputSize`] if `input_size == 0`.
    /// - [`ReservoirError::InvalidConnectivity`] unless `0 < connectivity <= 1`.
    pub fn new(
        units: usize, input_size: usize, connectivity: f64, seed: u64,
    ) -> ReservoirResult<Self> {
        let options = Self { units, input_size, connectivity, seed };
        options.validate()?;
        Ok(options)
    }

    /// Re-check the fields, e.g. of options built with a struct literal.
    ///
    /// # Errors
    /// Same as [`ReservoirOptions::new`].
    pub fn validate(&self) -> ReservoirResult<()> {
        if self.units == 0 {
            return Err(ReservoirError::InvalidUnits { units: self.units });
        }
        if self.input_size == 0 {
            return Err(ReservoirError::InvalidInputSize { input_size: self.input_size });
        }
        if !self.connectivity.is_finite() {
            return Err(ReservoirError::InvalidConnectivity {
                value: self.connectivity,
                reason: "Connectivity must be finite.",
            });
        }
        if self.connectivity <= 0.0 || self.connectivity > 1.0 {
            return Err(ReservoirError::InvalidConnectivity {
                value: self.connectivity,
                reason: "Connectivity must lie in (0, 1].",
            });
        }
        Ok(())
    }
}

impl Default for ReservoirOptions {
    fn default() -> Self {
        Self { units: 30, input_size: 1, connectivity: 1.0, seed: 1 }
    }
}
