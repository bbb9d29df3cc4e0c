//! Supervised frame built from lagged copies of a series.

use super::lag::MissingLags;
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};

/// Tabular view of a series for regression.
///
/// Each row holds `n_in` lagged values, oldest first (`t-n_in .. t-1`), followed by
/// the value at `t` as the target. Undefined lags are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisedFrame {
    n_in: usize,
    rows: Vec<Vec<f64>>,
    /// Timestamp of each row's target, when built from a `TimeSeries`.
    timestamps: Option<Vec<DateTime<Utc>>>,
    frequency: Option<Duration>,
}

/// Frame a raw value sequence into lagged rows.
///
/// With [`MissingLags::Drop`] every row containing a `NaN` is removed, which for a
/// complete series leaves `len - n_in` rows. With [`MissingLags::Retain`] the frame
/// has one row per observation.
///
/// # Example
///
/// ```
/// use epm_forecast::supervised::{series_to_supervised, MissingLags};
///
/// let frame = series_to_supervised(&[10.0, 12.0, 14.0, 16.0, 18.0], 2, MissingLags::Drop);
/// assert_eq!(frame.len(), 3);
/// assert_eq!(frame.row(0).unwrap(), &[10.0, 12.0, 14.0]);
/// assert_eq!(frame.row(2).unwrap(), &[14.0, 16.0, 18.0]);
/// ```
pub fn series_to_supervised(values: &[f64], n_in: usize, missing: MissingLags) -> SupervisedFrame {
    let (rows, _) = build_rows(values, n_in, missing);
    SupervisedFrame {
        n_in,
        rows,
        timestamps: None,
        frequency: None,
    }
}

/// Build rows and return the source index of each kept row.
fn build_rows(values: &[f64], n_in: usize, missing: MissingLags) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rows = Vec::with_capacity(values.len());
    let mut kept = Vec::with_capacity(values.len());

    for t in 0..values.len() {
        let row: Vec<f64> = (1..=n_in)
            .rev()
            .map(|lag| t.checked_sub(lag).map_or(f64::NAN, |idx| values[idx]))
            .chain(std::iter::once(values[t]))
            .collect();

        if missing == MissingLags::Drop && row.iter().any(|v| v.is_nan()) {
            continue;
        }
        rows.push(row);
        kept.push(t);
    }

    (rows, kept)
}

impl SupervisedFrame {
    /// Frame a time series, keeping the target timestamp of every row and the
    /// series frequency.
    pub fn from_series(series: &TimeSeries, n_in: usize, missing: MissingLags) -> Self {
        let (rows, kept) = build_rows(series.values(), n_in, missing);
        let timestamps = kept.iter().map(|&t| series.timestamps()[t]).collect();
        Self {
            n_in,
            rows,
            timestamps: Some(timestamps),
            frequency: series.frequency(),
        }
    }

    /// Number of lag columns.
    pub fn n_in(&self) -> usize {
        self.n_in
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns (lags plus target).
    pub fn n_cols(&self) -> usize {
        self.n_in + 1
    }

    /// Column names: `t-n .. t-1, t`.
    pub fn column_names(&self) -> Vec<String> {
        (1..=self.n_in)
            .rev()
            .map(|lag| format!("t-{}", lag))
            .chain(std::iter::once("t".to_string()))
            .collect()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Result<&[f64]> {
        self.rows
            .get(index)
            .map(|r| r.as_slice())
            .ok_or(ForecastError::IndexOutOfBounds {
                index,
                size: self.rows.len(),
            })
    }

    /// Lag values of a row, without the target.
    pub fn features(&self, index: usize) -> Result<&[f64]> {
        self.row(index).map(|r| &r[..self.n_in])
    }

    /// Target value of a row.
    pub fn target(&self, index: usize) -> Result<f64> {
        self.row(index).map(|r| r[self.n_in])
    }

    pub fn last_row(&self) -> Option<&[f64]> {
        self.rows.last().map(|r| r.as_slice())
    }

    /// Feature matrix, one row per observation.
    pub fn feature_matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r[..self.n_in].to_vec()).collect()
    }

    /// Target column.
    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r[self.n_in]).collect()
    }

    /// Split into feature matrix and target column.
    pub fn split_xy(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        (self.feature_matrix(), self.targets())
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    pub fn frequency(&self) -> Option<Duration> {
        self.frequency
    }

    /// Check if any cell is `NaN`.
    pub fn has_missing(&self) -> bool {
        self.rows.iter().flatten().any(|v| v.is_nan())
    }

    /// Return a copy with every `NaN` cell replaced by `value`.
    pub fn fill_missing(&self, value: f64) -> SupervisedFrame {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|&v| if v.is_nan() { value } else { v })
                    .collect()
            })
            .collect();
        SupervisedFrame {
            rows,
            ..self.clone()
        }
    }

    /// Return a copy without rows containing `NaN`.
    pub fn drop_incomplete(&self) -> SupervisedFrame {
        let keep: Vec<usize> = (0..self.rows.len())
            .filter(|&i| !self.rows[i].iter().any(|v| v.is_nan()))
            .collect();
        self.select_rows(&keep)
    }

    /// Rows `start..end` as a new frame.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<SupervisedFrame> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }
        Ok(self.select_rows(&(start..end).collect::<Vec<_>>()))
    }

    fn select_rows(&self, indices: &[usize]) -> SupervisedFrame {
        SupervisedFrame {
            n_in: self.n_in,
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            timestamps: self
                .timestamps
                .as_ref()
                .map(|ts| indices.iter().map(|&i| ts[i]).collect()),
            frequency: self.frequency,
        }
    }
}
