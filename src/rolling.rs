//! Recursive multi-step forecasting with a one-step regressor.
//!
//! Each prediction is appended to the lag window and the oldest lag is dropped, so
//! step `h + 1` sees the prediction of step `h` as its most recent lag. Errors
//! compound: nothing corrects the window with observed values.

use crate::core::{step_timestamps, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use crate::supervised::SupervisedFrame;
use std::collections::VecDeque;

/// Forecast `steps_ahead` values from an initial lag window (oldest first).
///
/// The first error returned by the model aborts the loop and is returned as is.
///
/// # Example
///
/// ```
/// use epm_forecast::models::{LagMean, Regressor};
/// use epm_forecast::rolling::rolling_forecast;
///
/// let mut model = LagMean::new();
/// model.fit(&[vec![10.0, 12.0], vec![12.0, 14.0]], &[14.0, 16.0]).unwrap();
///
/// let forecast = rolling_forecast(&model, &[16.0, 18.0], 2).unwrap();
/// assert_eq!(forecast, vec![17.0, 17.5]);
/// ```
pub fn rolling_forecast<R>(model: &R, initial: &[f64], steps_ahead: usize) -> Result<Vec<f64>>
where
    R: Regressor + ?Sized,
{
    let mut window: VecDeque<f64> = initial.iter().copied().collect();
    let mut forecast = Vec::with_capacity(steps_ahead);

    for _ in 0..steps_ahead {
        let pred = model.predict(window.make_contiguous())?;
        forecast.push(pred);
        if window.pop_front().is_some() {
            window.push_back(pred);
        }
    }

    Ok(forecast)
}

/// First feature row after a complete frame row: the oldest lag is dropped so the
/// row's target becomes the most recent lag.
///
/// ```
/// use epm_forecast::rolling::next_features;
///
/// assert_eq!(next_features(&[14.0, 16.0, 18.0]), &[16.0, 18.0]);
/// ```
pub fn next_features(frame_row: &[f64]) -> &[f64] {
    frame_row.get(1..).unwrap_or(&[])
}

/// Rolling forecaster bound to a fixed horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingForecaster {
    steps_ahead: usize,
}

impl RollingForecaster {
    pub fn new(steps_ahead: usize) -> Self {
        Self { steps_ahead }
    }

    pub fn steps_ahead(&self) -> usize {
        self.steps_ahead
    }

    /// Forecast from an explicit lag window.
    pub fn forecast<R>(&self, model: &R, initial: &[f64]) -> Result<Forecast>
    where
        R: Regressor + ?Sized,
    {
        rolling_forecast(model, initial, self.steps_ahead).map(Forecast::from_values)
    }

    /// Forecast the steps following the last row of `frame`.
    ///
    /// The forecast is stamped when the frame carries timestamps and a frequency.
    pub fn forecast_after<R>(&self, model: &R, frame: &SupervisedFrame) -> Result<Forecast>
    where
        R: Regressor + ?Sized,
    {
        let last = frame.last_row().ok_or(ForecastError::EmptyData)?;
        if last.iter().any(|v| v.is_nan()) {
            return Err(ForecastError::MissingValues);
        }

        // Stamps first, so an unrepresentable horizon fails before the model runs
        let last_stamp = frame.timestamps().and_then(|ts| ts.last().copied());
        let stamps = match (last_stamp, frame.frequency()) {
            (Some(last), Some(freq)) => Some(step_timestamps(last, freq, self.steps_ahead)?),
            _ => None,
        };

        let forecast = self.forecast(model, next_features(last))?;
        match stamps {
            Some(stamps) => forecast.with_timestamps(stamps),
            None => Ok(forecast),
        }
    }
}
