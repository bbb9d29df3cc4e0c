//! Cross-validation of rolling forecasts over a supervised frame.
//!
//! Each fold fits a fresh regressor on the rows before the fold origin and
//! rolling-forecasts the next `horizon` targets from the last training row, the
//! same way a fitted model is used after training.

use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use crate::rolling::{next_features, rolling_forecast};
use crate::supervised::SupervisedFrame;
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use tracing::debug;

/// Cross-validation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CVStrategy {
    /// Rolling window: fixed training window size, slides forward.
    Rolling,
    /// Expanding window: training window grows, starts from initial_window.
    Expanding,
}

impl Default for CVStrategy {
    fn default() -> Self {
        Self::Expanding
    }
}

/// Configuration for time series cross-validation.
#[derive(Debug, Clone)]
pub struct CVConfig {
    /// Forecast horizon for each fold.
    pub horizon: usize,
    /// Initial training window size, in frame rows.
    pub initial_window: usize,
    /// Step size between folds.
    pub step_size: usize,
    /// Cross-validation strategy.
    pub strategy: CVStrategy,
    /// Optional seasonal period for MASE calculation.
    pub seasonal_period: Option<usize>,
}

impl Default for CVConfig {
    fn default() -> Self {
        Self {
            horizon: 1,
            initial_window: 10,
            step_size: 1,
            strategy: CVStrategy::Expanding,
            seasonal_period: None,
        }
    }
}

impl CVConfig {
    /// Create a new CV configuration with expanding window strategy.
    pub fn expanding(initial_window: usize, horizon: usize) -> Self {
        Self {
            initial_window,
            horizon,
            ..Self::default()
        }
    }

    /// Create a new CV configuration with rolling window strategy.
    pub fn rolling(window_size: usize, horizon: usize) -> Self {
        Self {
            initial_window: window_size,
            horizon,
            strategy: CVStrategy::Rolling,
            ..Self::default()
        }
    }

    /// Expanding layout with `n_folds` back-to-back forecast windows of `horizon`
    /// rows ending at the last row of a frame with `n_rows` rows.
    pub fn trailing_folds(n_rows: usize, n_folds: usize, horizon: usize) -> Result<Self> {
        let needed = n_folds * horizon + 1;
        if n_folds == 0 || horizon == 0 || n_rows < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: n_rows,
            });
        }
        Ok(Self::expanding(n_rows - n_folds * horizon, horizon).with_step_size(horizon))
    }

    /// Set the step size between folds.
    pub fn with_step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    /// Set the seasonal period for MASE calculation.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = Some(period);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }
        if self.step_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "step_size must be positive".to_string(),
            ));
        }
        if self.initial_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "initial_window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Results from cross-validation.
#[derive(Debug, Clone)]
pub struct CVResults {
    /// Number of folds evaluated.
    pub n_folds: usize,
    /// Aggregated metrics across all folds.
    pub aggregated: AggregatedMetrics,
    /// Per-fold metrics.
    pub fold_metrics: Vec<AccuracyMetrics>,
    /// Per-fold actual values (flattened).
    pub actual_values: Vec<f64>,
    /// Per-fold predicted values (flattened).
    pub predicted_values: Vec<f64>,
}

/// Aggregated metrics from cross-validation.
#[derive(Debug, Clone)]
pub struct AggregatedMetrics {
    /// Mean MAE across folds.
    pub mae: f64,
    /// Mean RMSE across folds.
    pub rmse: f64,
    /// Mean SMAPE across folds.
    pub smape: f64,
    /// Mean MAPE across folds (None if any fold had zeros).
    pub mape: Option<f64>,
    /// Standard deviation of MAE across folds.
    pub mae_std: f64,
    /// Standard deviation of RMSE across folds.
    pub rmse_std: f64,
}

impl AggregatedMetrics {
    fn empty() -> Self {
        Self {
            mae: f64::NAN,
            rmse: f64::NAN,
            smape: f64::NAN,
            mape: None,
            mae_std: f64::NAN,
            rmse_std: f64::NAN,
        }
    }

    fn from_folds(folds: &[AccuracyMetrics]) -> Self {
        if folds.is_empty() {
            return Self::empty();
        }

        let mae_values: Vec<f64> = folds.iter().map(|m| m.mae).collect();
        let rmse_values: Vec<f64> = folds.iter().map(|m| m.rmse).collect();
        let smape_values: Vec<f64> = folds.iter().map(|m| m.smape).collect();

        // MAPE is only valid if all folds have it
        let mape = folds
            .iter()
            .map(|m| m.mape)
            .collect::<Option<Vec<f64>>>()
            .map(|v| mean(&v));

        Self {
            mae: mean(&mae_values),
            rmse: mean(&rmse_values),
            smape: mean(&smape_values),
            mape,
            mae_std: std_dev(&mae_values),
            rmse_std: std_dev(&rmse_values),
        }
    }
}

/// Cross-validate a regressor over a complete supervised frame.
///
/// # Arguments
/// * `config` - Cross-validation configuration
/// * `frame` - Frame without missing markers
/// * `model_factory` - Function that creates a fresh model instance for each fold
///
/// # Example
/// ```
/// use epm_forecast::models::LastValue;
/// use epm_forecast::supervised::{series_to_supervised, MissingLags};
/// use epm_forecast::utils::cross_validation::{cross_validate, CVConfig};
///
/// let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
/// let frame = series_to_supervised(&values, 2, MissingLags::Drop);
///
/// let config = CVConfig::expanding(10, 1).with_step_size(2);
/// let results = cross_validate(&config, &frame, LastValue::new).unwrap();
///
/// assert!(results.n_folds > 0);
/// assert!(results.aggregated.mae >= 0.0);
/// ```
pub fn cross_validate<R, Factory>(
    config: &CVConfig,
    frame: &SupervisedFrame,
    model_factory: Factory,
) -> Result<CVResults>
where
    R: Regressor,
    Factory: Fn() -> R,
{
    config.validate()?;
    if frame.has_missing() {
        return Err(ForecastError::MissingValues);
    }

    let n = frame.len();
    let targets = frame.targets();
    let mut fold_metrics = Vec::new();
    let mut all_actual = Vec::new();
    let mut all_predicted = Vec::new();

    let mut origin = config.initial_window;
    while origin + config.horizon <= n {
        let train_start = match config.strategy {
            CVStrategy::Rolling => origin.saturating_sub(config.initial_window),
            CVStrategy::Expanding => 0,
        };

        let train = frame.slice_rows(train_start, origin)?;
        let mut model = model_factory();
        model.fit_frame(&train)?;

        let last_train_row = frame.row(origin - 1)?;
        let predictions = rolling_forecast(&model, next_features(last_train_row), config.horizon)?;
        let actual = &targets[origin..origin + config.horizon];

        let metrics = calculate_metrics(actual, &predictions, config.seasonal_period)?;
        debug!(
            model = model.name(),
            origin,
            train_rows = origin - train_start,
            mae = metrics.mae,
            "cross-validation fold evaluated"
        );
        fold_metrics.push(metrics);

        all_actual.extend_from_slice(actual);
        all_predicted.extend(predictions);

        origin += config.step_size;
    }

    Ok(CVResults {
        n_folds: fold_metrics.len(),
        aggregated: AggregatedMetrics::from_folds(&fold_metrics),
        fold_metrics,
        actual_values: all_actual,
        predicted_values: all_predicted,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate sample standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
