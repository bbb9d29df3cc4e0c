//! Lag-feature framing of univariate series.
//!
//! Turns a series into a supervised learning table where each row pairs the
//! previous `n_in` observations with the current one.
//!
//! # Example
//!
//! ```
//! use epm_forecast::supervised::{series_to_supervised, MissingLags};
//!
//! let values = [10.0, 12.0, 14.0, 16.0, 18.0];
//!
//! // Training frame: incomplete leading rows are dropped
//! let train = series_to_supervised(&values, 2, MissingLags::Drop);
//! assert_eq!(train.len(), 3);
//!
//! // Aligned frame: one row per observation, undefined lags are NaN
//! let aligned = series_to_supervised(&values, 2, MissingLags::Retain);
//! assert_eq!(aligned.len(), 5);
//! ```

mod frame;
mod lag;

pub use frame::{series_to_supervised, SupervisedFrame};
pub use lag::{LagOrder, MissingLags};
