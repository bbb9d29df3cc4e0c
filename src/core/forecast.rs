//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// A forecast sequence: point predictions in step order, optionally stamped with the
/// timestamps they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    timestamps: Option<Vec<DateTime<Utc>>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            timestamps: None,
        }
    }

    /// Attach one timestamp per prediction.
    pub fn with_timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if timestamps.len() != self.point.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.point.len(),
                got: timestamps.len(),
            });
        }
        self.timestamps = Some(timestamps);
        Ok(self)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.point
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// Prediction at step `h` (0-based).
    pub fn get(&self, h: usize) -> Result<f64> {
        self.point
            .get(h)
            .copied()
            .ok_or(ForecastError::IndexOutOfBounds {
                index: h,
                size: self.point.len(),
            })
    }

    /// Pairs of (timestamp, prediction); empty when the forecast is not stamped.
    pub fn iter_stamped(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .flatten()
            .copied()
            .zip(self.point.iter().copied())
    }

    pub fn into_values(self) -> Vec<f64> {
        self.point
    }
}
