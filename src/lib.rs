//! # epm-forecast
//!
//! Lag-feature forecasting for energy and fuel price series.
//!
//! A univariate series is framed into a supervised table of lagged observations
//! ([`supervised::series_to_supervised`]), a one-step regressor is fit on it, and
//! multi-step forecasts are produced recursively by feeding each prediction back
//! in as the newest lag ([`rolling::rolling_forecast`]). [`pipeline::ForecastPipeline`]
//! ties these together with a train/test split, cross-validated model selection
//! and accuracy scoring.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rolling;
pub mod supervised;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, MissingValuePolicy, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{ModelRegistry, ModelSpec, Regressor};
    pub use crate::pipeline::{ForecastPipeline, PipelineConfig, PipelineReport};
    pub use crate::rolling::{rolling_forecast, RollingForecaster};
    pub use crate::supervised::{series_to_supervised, MissingLags, SupervisedFrame};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
