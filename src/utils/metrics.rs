//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error in percent (None if zeros in actual)
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error in percent
    pub smape: f64,
    /// Mean Absolute Scaled Error (None if insufficient data)
    pub mase: Option<f64>,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// # Arguments
/// * `actual` - Actual observed values
/// * `predicted` - Predicted/forecast values
/// * `seasonal_period` - Optional seasonal period for MASE calculation
pub fn calculate_metrics(
    actual: &[f64],
    predicted: &[f64],
    seasonal_period: Option<usize>,
) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let mae = mae(actual, predicted);
    let mse = mse(actual, predicted);

    let mape = if actual.contains(&0.0) {
        None
    } else {
        Some(mape(actual, predicted))
    };

    let mean_actual = mean(actual);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res = mse * actual.len() as f64;
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape: smape(actual, predicted),
        mase: calculate_mase(actual, mae, seasonal_period),
        r_squared,
    })
}

/// MASE = MAE / MAE of the (seasonal) naive forecast over `actual`.
fn calculate_mase(
    actual: &[f64],
    forecast_mae: f64,
    seasonal_period: Option<usize>,
) -> Option<f64> {
    let period = seasonal_period.unwrap_or(1);
    if actual.len() <= period {
        return None;
    }

    let naive_mae = mae(&actual[period..], &actual[..actual.len() - period]);
    if naive_mae == 0.0 {
        return None;
    }

    Some(forecast_mae / naive_mae)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of `f(actual, predicted)`; NaN for empty or mismatched input.
fn mean_of<F>(actual: &[f64], predicted: &[f64], f: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| f(a, p))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual, predicted, |a, p| (a - p).abs())
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual, predicted, |a, p| (a - p).powi(2))
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Calculate MAPE in percent; infinite when an actual value is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    100.0 * mean_of(actual, predicted, |a, p| ((a - p) / a).abs())
}

/// Calculate SMAPE in percent between two slices.
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    100.0
        * mean_of(actual, predicted, |a, p| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
}
