//! Baseline lag regressors.
//!
//! Both models ignore the targets beyond recording the expected row width, which
//! makes them useful reference points when selecting among fitted models.

use crate::error::{ForecastError, Result};
use crate::models::traits::validate_training_set;
use crate::models::Regressor;

fn check_row(width: Option<usize>, features: &[f64]) -> Result<()> {
    let width = width.ok_or(ForecastError::FitRequired)?;
    if features.len() != width {
        return Err(ForecastError::DimensionMismatch {
            expected: width,
            got: features.len(),
        });
    }
    if width == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}

/// Predicts the most recent lag, i.e. a naive forecast.
#[derive(Debug, Clone, Default)]
pub struct LastValue {
    width: Option<usize>,
}

impl LastValue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for LastValue {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        self.width = Some(validate_training_set(features, targets)?);
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_row(self.width, features)?;
        // check_row guarantees a non-empty row
        Ok(features[features.len() - 1])
    }

    fn name(&self) -> &str {
        "LastValue"
    }

    fn is_fitted(&self) -> bool {
        self.width.is_some()
    }
}

/// Predicts the arithmetic mean of the lag window.
#[derive(Debug, Clone, Default)]
pub struct LagMean {
    width: Option<usize>,
}

impl LagMean {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for LagMean {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        self.width = Some(validate_training_set(features, targets)?);
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_row(self.width, features)?;
        Ok(features.iter().sum::<f64>() / features.len() as f64)
    }

    fn name(&self) -> &str {
        "LagMean"
    }

    fn is_fitted(&self) -> bool {
        self.width.is_some()
    }
}
