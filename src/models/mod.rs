//! Regression models over lag features.

mod traits;

pub mod baseline;
pub mod linear;

pub use baseline::{LagMean, LastValue};
pub use linear::LinearLagRegressor;
pub use traits::{BoxedRegressor, ModelRegistry, ModelSpec, Regressor};
