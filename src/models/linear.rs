//! Linear autoregression on the lag columns.
//!
//! Fits `y_t = c + b_1 * y_{t-n} + ... + b_n * y_{t-1}` by least squares, optionally
//! with a ridge penalty on the lag coefficients.

use crate::error::{ForecastError, Result};
use crate::models::traits::validate_training_set;
use crate::models::Regressor;
use crate::utils::ols::{ols_fit, OLSResult};

/// Least-squares regressor over lag features.
#[derive(Debug, Clone, Default)]
pub struct LinearLagRegressor {
    ridge: f64,
    fit: Option<OLSResult>,
}

impl LinearLagRegressor {
    /// Plain least squares.
    pub fn new() -> Self {
        Self::default()
    }

    /// Least squares with a ridge penalty on the lag coefficients.
    pub fn ridge(lambda: f64) -> Self {
        Self {
            ridge: lambda,
            fit: None,
        }
    }

    pub fn penalty(&self) -> f64 {
        self.ridge
    }

    /// Lag coefficients, oldest lag first.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coefficients.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }
}

impl Regressor for LinearLagRegressor {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        validate_training_set(features, targets)?;
        self.fit = Some(ols_fit(features, targets, self.ridge)?);
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.fit
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict_row(features)
    }

    fn name(&self) -> &str {
        "LinearLag"
    }

    fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervised::{series_to_supervised, MissingLags};
    use approx::assert_relative_eq;

    #[test]
    fn recovers_ar1_process() {
        // y_t = 0.5 + 0.8 * y_{t-1}
        let mut values = vec![10.0];
        for _ in 0..30 {
            let last = *values.last().unwrap();
            values.push(0.5 + 0.8 * last);
        }
        let frame = series_to_supervised(&values, 1, MissingLags::Drop);

        let mut model = LinearLagRegressor::new();
        model.fit_frame(&frame).unwrap();

        assert_relative_eq!(model.coefficients().unwrap()[0], 0.8, epsilon = 1e-4);
        assert_relative_eq!(model.intercept().unwrap(), 0.5, epsilon = 1e-3);
        assert_relative_eq!(model.predict(&[5.0]).unwrap(), 4.5, epsilon = 1e-3);
    }

    #[test]
    fn two_lag_model_recovers_sinusoid_recurrence() {
        // sin(w t) = 2 cos(w) sin(w (t-1)) - sin(w (t-2))
        let w = 0.5_f64;
        let values: Vec<f64> = (0..40).map(|t| 5.0 * (w * t as f64).sin()).collect();
        let frame = series_to_supervised(&values, 2, MissingLags::Drop);

        let mut model = LinearLagRegressor::new();
        model.fit_frame(&frame).unwrap();

        let coefs = model.coefficients().unwrap();
        assert_relative_eq!(coefs[0], -1.0, epsilon = 1e-4);
        assert_relative_eq!(coefs[1], 2.0 * w.cos(), epsilon = 1e-4);
        assert_relative_eq!(model.intercept().unwrap(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn requires_fit_and_matching_width() {
        let model = LinearLagRegressor::ridge(1.0);
        assert_eq!(model.penalty(), 1.0);
        assert!(!model.is_fitted());
        assert_eq!(model.predict(&[1.0]).unwrap_err(), ForecastError::FitRequired);

        let mut model = LinearLagRegressor::new();
        model
            .fit(&[vec![1.0], vec![2.0], vec![3.0]], &[2.0, 3.0, 4.0])
            .unwrap();
        assert!(matches!(
            model.predict(&[1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn negative_ridge_is_rejected() {
        let mut model = LinearLagRegressor::ridge(-0.5);
        let result = model.fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
        assert!(!model.is_fitted());
    }
}
