//! Fitting, scoring and model-selection helpers.

pub mod cross_validation;
pub mod metrics;
pub mod ols;
pub mod selection;

pub use cross_validation::{cross_validate, AggregatedMetrics, CVConfig, CVResults, CVStrategy};
pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use ols::{ols_fit, OLSResult};
pub use selection::{suggested_folds, CandidateScore, GridSearch, SearchResult, MAX_FOLDS};
