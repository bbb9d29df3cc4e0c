//! Lag order and missing-lag handling options.

use crate::error::{ForecastError, Result};

/// Number of lagged columns placed before the target column.
///
/// The wrapped `usize` cannot be negative; signed inputs (CLI arguments, config files)
/// go through `TryFrom<i64>`, which rejects negative orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LagOrder(usize);

impl LagOrder {
    pub const fn new(n_in: usize) -> Self {
        Self(n_in)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for LagOrder {
    fn from(n_in: usize) -> Self {
        Self(n_in)
    }
}

impl TryFrom<i64> for LagOrder {
    type Error = ForecastError;

    fn try_from(n_in: i64) -> Result<Self> {
        usize::try_from(n_in)
            .map(Self)
            .map_err(|_| ForecastError::InvalidLagOrder(n_in))
    }
}

/// What to do with the leading rows whose lags fall before the start of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLags {
    /// Drop incomplete rows; the frame is ready for training.
    Drop,
    /// Keep every row, marking undefined lags with `NaN` so rows stay aligned with
    /// the source observations.
    Retain,
}
