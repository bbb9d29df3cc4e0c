//! End-to-end evaluation of a lag regressor on a price series.
//!
//! [`ForecastPipeline::run`] takes a series and a set of candidate models and returns
//! a [`PipelineReport`]: the series is cleaned and rescaled, the tail is held out,
//! both parts are framed into lag rows, the best candidate is selected on the
//! training rows, and its rolling forecast over the held-out span is scored.

use crate::core::{Forecast, MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{ModelRegistry, ModelSpec, Regressor};
use crate::rolling::{next_features, RollingForecaster};
use crate::supervised::{LagOrder, MissingLags, SupervisedFrame};
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::utils::selection::{suggested_folds_capped, CandidateScore, GridSearch, MAX_FOLDS};
use tracing::{debug, info, warn};

/// Configuration for [`ForecastPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Number of lag columns.
    pub n_in: usize,
    /// Share of observations held out for testing, in (0, 1).
    pub test_fraction: f64,
    /// Every value is divided by this before framing (1000 turns EUR/MWh into EUR/kWh).
    pub scale: f64,
    /// How missing observations are handled before framing.
    pub missing_policy: MissingValuePolicy,
    /// Upper bound on cross-validation folds during model selection.
    pub max_folds: usize,
    /// Minimum share of timestamp gaps that must agree when inferring frequency.
    pub frequency_tolerance: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_in: 1,
            test_fraction: 0.2,
            scale: 1.0,
            missing_policy: MissingValuePolicy::Error,
            max_folds: MAX_FOLDS,
            frequency_tolerance: 0.5,
        }
    }
}

impl PipelineConfig {
    pub fn with_lags(mut self, n_in: usize) -> Self {
        self.n_in = n_in;
        self
    }

    /// Set the lag count from a signed value, e.g. one read from a config file.
    pub fn with_signed_lags(self, n_in: i64) -> Result<Self> {
        Ok(self.with_lags(LagOrder::try_from(n_in)?.get()))
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_scale(mut self, divisor: f64) -> Self {
        self.scale = divisor;
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn with_max_folds(mut self, max_folds: usize) -> Self {
        self.max_folds = max_folds;
        self
    }

    pub fn with_frequency_tolerance(mut self, tolerance: f64) -> Self {
        self.frequency_tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.frequency_tolerance) {
            return Err(ForecastError::InvalidParameter(format!(
                "frequency_tolerance must be in [0, 1], got {}",
                self.frequency_tolerance
            )));
        }
        Ok(())
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Name of the selected model specification.
    pub model_name: String,
    /// Cross-validation scores of every candidate (empty when no selection ran).
    pub candidate_scores: Vec<CandidateScore>,
    /// Lag rows of the training span, incomplete rows dropped.
    pub train_frame: SupervisedFrame,
    /// Lag rows of the test span. Lags reaching back before the span are placeholders
    /// holding the last training value, not the observed history; only the target
    /// column is guaranteed to be observed data.
    pub test_frame: SupervisedFrame,
    /// Rolling forecast over the test span, stamped with test timestamps.
    pub forecast: Forecast,
    /// Test-span accuracy of the forecast. MAPE and SMAPE are in percent
    /// (`4.2` means 4.2%), not fractions.
    pub metrics: AccuracyMetrics,
}

impl PipelineReport {
    /// Observed test values, aligned with `forecast`.
    pub fn actual(&self) -> Vec<f64> {
        self.test_frame.targets()
    }
}

/// Preprocess, split, select, fit and score in one call.
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    config: PipelineConfig,
}

impl ForecastPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean, rescale and attach a frequency to `series`.
    pub fn preprocess(&self, series: &TimeSeries) -> Result<TimeSeries> {
        let mut prepared = series
            .sanitized(self.config.missing_policy)?
            .scaled(self.config.scale)?;

        if prepared.frequency().is_none() {
            match prepared.infer_frequency(self.config.frequency_tolerance) {
                Ok(freq) => prepared.set_frequency(freq),
                Err(err) => {
                    warn!(error = %err, "frequency not inferred; forecasts stay unstamped")
                }
            }
        }
        Ok(prepared)
    }

    /// Evaluate the candidates in `registry` on a held-out tail of `series`.
    pub fn run(&self, series: &TimeSeries, registry: &ModelRegistry) -> Result<PipelineReport> {
        self.config.validate()?;
        if registry.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "model registry is empty".to_string(),
            ));
        }

        let prepared = self.preprocess(series)?;
        let n_test = (prepared.len() as f64 * self.config.test_fraction).round() as usize;
        if n_test == 0 {
            return Err(ForecastError::InsufficientData {
                needed: 1,
                got: 0,
            });
        }
        let (train, test) = prepared.train_test_split(n_test)?;

        let n_in = self.config.n_in;
        let train_frame = SupervisedFrame::from_series(&train, n_in, MissingLags::Drop);
        if train_frame.is_empty() {
            return Err(ForecastError::InsufficientData {
                needed: n_in + 1,
                got: train.len(),
            });
        }
        let (_, last_train_value) = train.last().ok_or(ForecastError::EmptyData)?;
        let test_frame = SupervisedFrame::from_series(&test, n_in, MissingLags::Retain)
            .fill_missing(last_train_value);

        info!(
            series = prepared.label().unwrap_or("unlabelled"),
            observations = prepared.len(),
            train = train.len(),
            test = n_test,
            n_in,
            "pipeline split prepared"
        );

        let n_folds = suggested_folds_capped(train_frame.len(), n_test, self.config.max_folds);
        let (model_name, model, candidate_scores) = if registry.len() > 1 && n_folds > 0 {
            let search = GridSearch::new(registry, n_folds, n_test).run(&train_frame)?;
            (search.best_name, search.best_model, search.scores)
        } else {
            let spec = registry.get(0).ok_or(ForecastError::EmptyData)?;
            if registry.len() > 1 {
                debug!(
                    candidates = registry.len(),
                    "too few training rows for selection; using first candidate"
                );
            }
            let mut model = spec.create();
            model.fit_frame(&train_frame)?;
            (spec.name.clone(), model, Vec::new())
        };

        let last_train_row = train_frame.last_row().ok_or(ForecastError::EmptyData)?;
        let forecast = RollingForecaster::new(n_test)
            .forecast(&model, next_features(last_train_row))?
            .with_timestamps(test.timestamps().to_vec())?;

        let actual = test_frame.targets();
        let metrics = calculate_metrics(&actual, forecast.values(), None)?;
        info!(
            model = %model_name,
            mae = metrics.mae,
            mape = ?metrics.mape,
            "pipeline evaluation finished"
        );

        Ok(PipelineReport {
            model_name,
            candidate_scores,
            train_frame,
            test_frame,
            forecast,
            metrics,
        })
    }

    /// Fit `spec` on the whole series and forecast `steps` observations past its end.
    pub fn forecast_ahead(
        &self,
        series: &TimeSeries,
        spec: &ModelSpec,
        steps: usize,
    ) -> Result<Forecast> {
        let prepared = self.preprocess(series)?;
        let frame = SupervisedFrame::from_series(&prepared, self.config.n_in, MissingLags::Drop);
        if frame.is_empty() {
            return Err(ForecastError::InsufficientData {
                needed: self.config.n_in + 1,
                got: prepared.len(),
            });
        }

        let mut model = spec.create();
        model.fit_frame(&frame)?;
        debug!(model = %spec.name, steps, rows = frame.len(), "forecasting past end of series");

        RollingForecaster::new(steps).forecast_after(&model, &frame)
    }
}
