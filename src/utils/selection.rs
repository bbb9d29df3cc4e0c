//! Model selection by cross-validated grid search.
//!
//! Every candidate in a [`ModelRegistry`] is cross-validated on trailing folds of
//! the training frame; the candidate with the lowest mean MAE is refit on the whole
//! frame.

use crate::error::{ForecastError, Result};
use crate::models::{BoxedRegressor, ModelRegistry, Regressor};
use crate::supervised::SupervisedFrame;
use crate::utils::cross_validation::{cross_validate, CVConfig, CVResults};
use tracing::{debug, info};

/// Upper bound on the number of folds used by [`suggested_folds`].
pub const MAX_FOLDS: usize = 10;

/// Number of folds of `test_len` rows that fit in the training data once a test-sized
/// tail is set aside, capped at [`MAX_FOLDS`].
///
/// ```
/// use epm_forecast::utils::selection::suggested_folds;
///
/// assert_eq!(suggested_folds(100, 20), 4);
/// assert_eq!(suggested_folds(1000, 10), 10);
/// assert_eq!(suggested_folds(10, 20), 0);
/// ```
pub fn suggested_folds(train_len: usize, test_len: usize) -> usize {
    suggested_folds_capped(train_len, test_len, MAX_FOLDS)
}

pub(crate) fn suggested_folds_capped(train_len: usize, test_len: usize, cap: usize) -> usize {
    if test_len == 0 {
        return 0;
    }
    (train_len.saturating_sub(test_len) / test_len).min(cap)
}

/// Cross-validation score of one candidate.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub name: String,
    pub results: CVResults,
}

/// Outcome of a grid search.
pub struct SearchResult {
    /// Name of the winning specification.
    pub best_name: String,
    /// Winning model, refit on the whole frame.
    pub best_model: BoxedRegressor,
    /// Scores of every candidate in registry order.
    pub scores: Vec<CandidateScore>,
}

impl SearchResult {
    /// Mean cross-validated MAE of the winner.
    pub fn best_mae(&self) -> f64 {
        self.scores
            .iter()
            .find(|s| s.name == self.best_name)
            .map_or(f64::NAN, |s| s.results.aggregated.mae)
    }
}

impl std::fmt::Debug for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchResult")
            .field("best_name", &self.best_name)
            .field("best_model", &self.best_model.name())
            .field("scores", &self.scores)
            .finish()
    }
}

/// Grid search over a registry of candidate regressors.
#[derive(Debug)]
pub struct GridSearch<'a> {
    registry: &'a ModelRegistry,
    n_folds: usize,
    horizon: usize,
}

impl<'a> GridSearch<'a> {
    /// Search with `n_folds` trailing folds, each forecasting `horizon` rows.
    pub fn new(registry: &'a ModelRegistry, n_folds: usize, horizon: usize) -> Self {
        Self {
            registry,
            n_folds,
            horizon,
        }
    }

    /// Cross-validate every candidate on `frame` and refit the best one on all of it.
    ///
    /// Candidates that fail to fit are skipped; ties keep the earlier candidate.
    pub fn run(&self, frame: &SupervisedFrame) -> Result<SearchResult> {
        if self.registry.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "model registry is empty".to_string(),
            ));
        }
        let config = CVConfig::trailing_folds(frame.len(), self.n_folds, self.horizon)?;

        let mut scores = Vec::with_capacity(self.registry.len());
        // (registry index, score index, mean MAE)
        let mut best: Option<(usize, usize, f64)> = None;

        for (spec_idx, spec) in self.registry.iter().enumerate() {
            let results = match cross_validate(&config, frame, || spec.create()) {
                Ok(results) => results,
                Err(err) => {
                    debug!(candidate = %spec.name, error = %err, "candidate skipped");
                    continue;
                }
            };
            let mae = results.aggregated.mae;
            debug!(candidate = %spec.name, mae, folds = results.n_folds, "candidate scored");

            if mae.is_finite() && best.map_or(true, |(_, _, best_mae)| mae < best_mae) {
                best = Some((spec_idx, scores.len(), mae));
            }
            scores.push(CandidateScore {
                name: spec.name.clone(),
                results,
            });
        }

        let (spec_idx, score_idx, best_mae) = best.ok_or_else(|| {
            ForecastError::ComputationError("no candidate could be evaluated".to_string())
        })?;
        let best_name = scores[score_idx].name.clone();
        let spec = self.registry.get(spec_idx).ok_or(ForecastError::IndexOutOfBounds {
            index: spec_idx,
            size: self.registry.len(),
        })?;

        let mut best_model = spec.create();
        best_model.fit_frame(frame)?;
        info!(
            model = %best_name,
            mae = best_mae,
            candidates = scores.len(),
            "grid search selected model"
        );

        Ok(SearchResult {
            best_name,
            best_model,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LagMean, LastValue, LinearLagRegressor, ModelSpec};
    use crate::supervised::{series_to_supervised, MissingLags};

    fn trend_frame() -> SupervisedFrame {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + 1.5 * i as f64).collect();
        series_to_supervised(&values, 1, MissingLags::Drop)
    }

    #[test]
    fn suggested_folds_follows_fold_rule() {
        assert_eq!(suggested_folds(50, 10), 4);
        assert_eq!(suggested_folds(500, 10), MAX_FOLDS);
        assert_eq!(suggested_folds(15, 10), 0);
        assert_eq!(suggested_folds(5, 10), 0);
        assert_eq!(suggested_folds(50, 0), 0);
        assert_eq!(suggested_folds_capped(500, 10, 3), 3);
    }

    #[test]
    fn linear_model_wins_on_trend() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelSpec::new("LastValue", || Box::new(LastValue::new())));
        registry.register(ModelSpec::new("LagMean", || Box::new(LagMean::new())));
        registry.register(ModelSpec::new("Linear", || Box::new(LinearLagRegressor::new())));

        let result = GridSearch::new(&registry, 3, 5).run(&trend_frame()).unwrap();

        assert_eq!(result.best_name, "Linear");
        assert!(result.best_model.is_fitted());
        assert_eq!(result.scores.len(), 3);
        assert!(result.best_mae() < 1e-4);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelSpec::new("first", || Box::new(LastValue::new())));
        registry.register(ModelSpec::new("second", || Box::new(LastValue::new())));

        let result = GridSearch::new(&registry, 2, 3).run(&trend_frame()).unwrap();
        assert_eq!(result.best_name, "first");
    }

    #[test]
    fn failing_candidates_are_skipped() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelSpec::new("broken", || {
            Box::new(LinearLagRegressor::ridge(-1.0))
        }));
        registry.register(ModelSpec::new("LastValue", || Box::new(LastValue::new())));

        let result = GridSearch::new(&registry, 2, 3).run(&trend_frame()).unwrap();
        assert_eq!(result.best_name, "LastValue");
        assert_eq!(result.scores.len(), 1);
    }

    #[test]
    fn all_candidates_failing_is_an_error() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelSpec::new("broken", || {
            Box::new(LinearLagRegressor::ridge(-1.0))
        }));

        assert!(matches!(
            GridSearch::new(&registry, 2, 3).run(&trend_frame()),
            Err(ForecastError::ComputationError(_))
        ));
    }

    #[test]
    fn empty_registry_or_short_frame_is_rejected() {
        let registry = ModelRegistry::new();
        assert!(matches!(
            GridSearch::new(&registry, 2, 3).run(&trend_frame()),
            Err(ForecastError::InvalidParameter(_))
        ));

        let registry = ModelRegistry::with_builtin();
        let short = series_to_supervised(&[1.0, 2.0, 3.0, 4.0], 1, MissingLags::Drop);
        assert!(matches!(
            GridSearch::new(&registry, 2, 3).run(&short),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
