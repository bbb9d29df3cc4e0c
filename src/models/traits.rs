//! Regressor trait defining the common interface for lag-feature models.

use crate::error::{ForecastError, Result};
use crate::supervised::SupervisedFrame;

/// Common interface for models that map a feature row to a single value.
///
/// This trait is object-safe and can be used with `Box<dyn Regressor>`.
pub trait Regressor {
    /// Fit the model on a feature matrix and its targets.
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict the value following one feature row.
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Predict one value per feature row.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Fit on the lag columns and target of a complete supervised frame.
    fn fit_frame(&mut self, frame: &SupervisedFrame) -> Result<()> {
        if frame.has_missing() {
            return Err(ForecastError::MissingValues);
        }
        let (features, targets) = frame.split_xy();
        self.fit(&features, &targets)
    }

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        (**self).fit(features, targets)
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        (**self).predict(features)
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        (**self).predict_batch(rows)
    }

    fn fit_frame(&mut self, frame: &SupervisedFrame) -> Result<()> {
        (**self).fit_frame(frame)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}

/// Type alias for boxed regressor trait objects.
///
/// # Example
///
/// ```
/// use epm_forecast::models::{BoxedRegressor, LastValue, Regressor};
///
/// let model: BoxedRegressor = Box::new(LastValue::new());
/// assert_eq!(model.name(), "LastValue");
/// ```
pub type BoxedRegressor = Box<dyn Regressor>;

/// Check that a training set is non-empty and rectangular; returns the row width.
pub(crate) fn validate_training_set(features: &[Vec<f64>], targets: &[f64]) -> Result<usize> {
    if targets.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if features.len() != targets.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: targets.len(),
            got: features.len(),
        });
    }
    let width = features[0].len();
    for row in features {
        if row.len() != width {
            return Err(ForecastError::DimensionMismatch {
                expected: width,
                got: row.len(),
            });
        }
    }
    if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }
    Ok(width)
}

/// Model specification for model selection.
///
/// Contains a display name and a factory producing fresh, unfitted instances.
///
/// # Example
///
/// ```
/// use epm_forecast::models::{LagMean, LinearLagRegressor, ModelSpec, Regressor};
///
/// let specs = vec![
///     ModelSpec::new("LagMean", || Box::new(LagMean::new())),
///     ModelSpec::with_param("Ridge(1.0)", |l| Box::new(LinearLagRegressor::ridge(l)), 1.0),
/// ];
///
/// for spec in &specs {
///     let model = spec.create();
///     assert!(!model.is_fitted());
/// }
/// ```
pub struct ModelSpec {
    /// Display name of the model
    pub name: String,
    /// Factory function to create a new instance
    factory: Box<dyn Fn() -> BoxedRegressor + Send + Sync>,
}

impl ModelSpec {
    /// Create a model spec with a simple factory.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> BoxedRegressor + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// Create a model spec for one point of a hyperparameter grid.
    pub fn with_param<P, F>(name: impl Into<String>, factory: F, param: P) -> Self
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P) -> BoxedRegressor + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(move || factory(param.clone())),
        }
    }

    /// Create a new model instance.
    pub fn create(&self) -> BoxedRegressor {
        (self.factory)()
    }
}

impl std::fmt::Debug for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSpec").field("name", &self.name).finish()
    }
}

/// Ordered collection of candidate model specifications.
///
/// # Example
///
/// ```
/// use epm_forecast::models::{LastValue, ModelRegistry, ModelSpec, Regressor};
///
/// let mut registry = ModelRegistry::new();
/// registry.register(ModelSpec::new("LastValue", || Box::new(LastValue::new())));
///
/// for spec in registry.iter() {
///     let model = spec.create();
///     assert_eq!(model.name(), spec.name);
/// }
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// Registry with the built-in lag regressors: last value, lag mean, and a ridge
    /// grid over the linear model.
    pub fn with_builtin() -> Self {
        use crate::models::{LagMean, LastValue, LinearLagRegressor};

        let mut registry = Self::new();
        registry.register(ModelSpec::new("LastValue", || Box::new(LastValue::new())));
        registry.register(ModelSpec::new("LagMean", || Box::new(LagMean::new())));
        for lambda in [0.0, 0.1, 1.0, 10.0] {
            registry.register(ModelSpec::with_param(
                format!("Linear(ridge={})", lambda),
                |l| Box::new(LinearLagRegressor::ridge(l)),
                lambda,
            ));
        }
        registry
    }

    /// Register a model specification.
    pub fn register(&mut self, spec: ModelSpec) {
        self.models.push(spec);
    }

    /// Get the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Get a specification by position.
    pub fn get(&self, index: usize) -> Option<&ModelSpec> {
        self.models.get(index)
    }

    /// Find a specification by name.
    pub fn find(&self, name: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|s| s.name == name)
    }

    /// Iterate over model specifications.
    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }
}
