//! TimeSeries data structure for representing a univariate price series.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Policy for handling missing values (NaN/Inf).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    /// Drop observations with missing values.
    Drop,
    /// Fill with a specific value.
    Fill(f64),
    /// Forward fill (use previous valid value).
    ForwardFill,
    /// Linear interpolation between valid neighbours, edges filled with the nearest value.
    Interpolate,
    /// Return error if missing values found.
    Error,
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        Self::Error
    }
}

/// A univariate time series with strictly increasing timestamps.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    metadata: HashMap<String, String>,
    frequency: Option<Duration>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    metadata: HashMap<String, String>,
    frequency: Option<Duration>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Name of the measured quantity (e.g. `"PUN"` or `"BENZINA"`).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn frequency(mut self, freq: Duration) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let mut ts = TimeSeries::univariate(self.timestamps, self.values)?;
        ts.label = self.label;
        ts.metadata = self.metadata;
        ts.frequency = self.frequency;
        Ok(ts)
    }
}

impl TimeSeries {
    /// Create a univariate time series.
    ///
    /// Timestamps must be strictly increasing and match the number of values.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        if values.len() != timestamps.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
            metadata: HashMap::new(),
            frequency: None,
        })
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the last observation, if any.
    pub fn last(&self) -> Option<(DateTime<Utc>, f64)> {
        self.timestamps.last().copied().zip(self.values.last().copied())
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Get frequency.
    pub fn frequency(&self) -> Option<Duration> {
        self.frequency
    }

    /// Set frequency.
    pub fn set_frequency(&mut self, freq: Duration) {
        self.frequency = Some(freq);
    }

    /// Copy every attribute except the observations.
    fn with_observations(&self, timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> TimeSeries {
        TimeSeries {
            timestamps,
            values,
            label: self.label.clone(),
            metadata: self.metadata.clone(),
            frequency: self.frequency,
        }
    }

    /// Extract the observations in `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
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

        Ok(self.with_observations(
            self.timestamps[start..end].to_vec(),
            self.values[start..end].to_vec(),
        ))
    }

    /// Split into a training head and a test tail holding the last `n_test` observations.
    pub fn train_test_split(&self, n_test: usize) -> Result<(TimeSeries, TimeSeries)> {
        if n_test > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: n_test,
                got: self.len(),
            });
        }
        let cut = self.len() - n_test;
        Ok((self.slice(0, cut)?, self.slice(cut, self.len())?))
    }

    /// Return a copy with every value divided by `divisor`.
    pub fn scaled(&self, divisor: f64) -> Result<TimeSeries> {
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "scale divisor must be finite and non-zero, got {}",
                divisor
            )));
        }
        let values = self.values.iter().map(|v| v / divisor).collect();
        Ok(self.with_observations(self.timestamps.clone(), values))
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Return a sanitized copy with missing values handled.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> Result<TimeSeries> {
        match policy {
            MissingValuePolicy::Error => {
                if self.has_missing_values() {
                    return Err(ForecastError::MissingValues);
                }
                Ok(self.clone())
            }
            MissingValuePolicy::Drop => {
                let (timestamps, values) = self
                    .timestamps
                    .iter()
                    .zip(&self.values)
                    .filter(|(_, v)| v.is_finite())
                    .map(|(t, v)| (*t, *v))
                    .unzip();
                Ok(self.with_observations(timestamps, values))
            }
            MissingValuePolicy::Fill(fill_value) => {
                let values = self
                    .values
                    .iter()
                    .map(|&v| if v.is_finite() { v } else { fill_value })
                    .collect();
                Ok(self.with_observations(self.timestamps.clone(), values))
            }
            MissingValuePolicy::ForwardFill => {
                let mut last_valid = None;
                let values = self
                    .values
                    .iter()
                    .map(|&v| {
                        if v.is_finite() {
                            last_valid = Some(v);
                            v
                        } else {
                            last_valid.unwrap_or(v)
                        }
                    })
                    .collect();
                Ok(self.with_observations(self.timestamps.clone(), values))
            }
            MissingValuePolicy::Interpolate => Ok(self.with_observations(
                self.timestamps.clone(),
                interpolate_series(&self.values),
            )),
        }
    }

    /// Infer frequency as the modal spacing between timestamps.
    ///
    /// `tolerance` is the minimum share of gaps that must equal the modal one.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Duration> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // Smallest spacing wins ties so the result does not depend on hash order.
        let (modal_diff, modal_count) = counts
            .iter()
            .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then(db.cmp(da)))
            .map(|(&diff, &count)| (diff, count))
            .ok_or(ForecastError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let total_count = self.len() - 1;
        let modal_ratio = modal_count as f64 / total_count as f64;

        if modal_ratio < tolerance {
            return Err(ForecastError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Duration::seconds(modal_diff))
    }

    /// Set frequency from timestamps (auto-infer).
    pub fn set_frequency_from_timestamps(&mut self) -> Result<()> {
        let freq = self.infer_frequency(0.5)?;
        self.frequency = Some(freq);
        Ok(())
    }

    /// Timestamps of the `steps` observations following the end of the series.
    pub fn future_timestamps(&self, steps: usize) -> Result<Vec<DateTime<Utc>>> {
        let freq = self.frequency.ok_or_else(|| {
            ForecastError::FrequencyInference("series has no frequency set".to_string())
        })?;
        let (last, _) = self.last().ok_or(ForecastError::EmptyData)?;
        step_timestamps(last, freq, steps)
    }
}

/// `steps` timestamps spaced by `freq`, starting one step after `last`.
///
/// Fails instead of wrapping when a stamp falls outside the representable range.
pub(crate) fn step_timestamps(
    last: DateTime<Utc>,
    freq: Duration,
    steps: usize,
) -> Result<Vec<DateTime<Utc>>> {
    let overflow = |h: usize| {
        ForecastError::TimestampError(format!(
            "step {} after {} overflows the timestamp range",
            h, last
        ))
    };
    let n = i32::try_from(steps).map_err(|_| overflow(steps))?;

    (1..=n)
        .map(|h| {
            freq.checked_mul(h)
                .and_then(|offset| last.checked_add_signed(offset))
                .ok_or_else(|| overflow(h as usize))
        })
        .collect()
}

/// Linear interpolation over non-finite runs, edges filled with the nearest valid value.
fn interpolate_series(values: &[f64]) -> Vec<f64> {
    let mut result = values.to_vec();
    let n = result.len();

    let mut i = 0;
    while i < n {
        if result[i].is_finite() {
            i += 1;
            continue;
        }

        let start = i;
        while i < n && !result[i].is_finite() {
            i += 1;
        }
        let end = i;

        let left = start.checked_sub(1).map(|idx| result[idx]);
        let right = (end < n).then(|| result[end]);

        match (left, right) {
            (Some(l), Some(r)) => {
                let segments = (end - start + 1) as f64;
                for (j, idx) in (start..end).enumerate() {
                    let t = (j + 1) as f64 / segments;
                    result[idx] = l + t * (r - l);
                }
            }
            (Some(l), None) => result[start..end].fill(l),
            (None, Some(r)) => result[start..end].fill(r),
            // All values missing
            (None, None) => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn make_weekly_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::weeks(i as i64)).collect()
    }

    #[test]
    fn time_series_constructs_univariate_data() {
        let timestamps = make_weekly_timestamps(5);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let ts = TimeSeries::univariate(timestamps.clone(), values.clone()).unwrap();

        assert_eq!(ts.len(), 5);
        assert!(!ts.is_empty());
        assert_eq!(ts.values(), &values);
        assert_eq!(ts.timestamps(), &timestamps);
        assert_eq!(ts.last(), Some((timestamps[4], 5.0)));
    }

    #[test]
    fn builder_sets_label_metadata_and_frequency() {
        let ts = TimeSeriesBuilder::new()
            .timestamps(make_weekly_timestamps(3))
            .values(vec![1.8, 1.9, 1.85])
            .label("BENZINA")
            .metadata("unit", "EUR/l")
            .frequency(Duration::weeks(1))
            .build()
            .unwrap();

        assert_eq!(ts.label(), Some("BENZINA"));
        assert_eq!(ts.metadata().get("unit"), Some(&"EUR/l".to_string()));
        assert_eq!(ts.frequency(), Some(Duration::weeks(1)));
    }

    #[test]
    fn time_series_rejects_non_increasing_timestamps() {
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
        ];
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));

        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
        ];
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn time_series_rejects_length_mismatch() {
        let result = TimeSeries::univariate(make_weekly_timestamps(3), vec![1.0, 2.0]);
        assert_eq!(
            result.unwrap_err(),
            ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn empty_series_is_valid() {
        let ts = TimeSeries::univariate(vec![], vec![]).unwrap();
        assert!(ts.is_empty());
        assert!(ts.last().is_none());
    }

    #[test]
    fn slice_preserves_attributes() {
        let mut ts = TimeSeriesBuilder::new()
            .timestamps(make_weekly_timestamps(5))
            .values(vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .label("PUN")
            .build()
            .unwrap();
        ts.set_frequency(Duration::weeks(1));

        let sliced = ts.slice(1, 4).unwrap();

        assert_eq!(sliced.values(), &[2.0, 3.0, 4.0]);
        assert_eq!(sliced.label(), Some("PUN"));
        assert_eq!(sliced.frequency(), Some(Duration::weeks(1)));

        assert!(ts.slice(3, 2).is_err());
        assert!(matches!(
            ts.slice(0, 6),
            Err(ForecastError::IndexOutOfBounds { index: 6, size: 5 })
        ));
    }

    #[test]
    fn train_test_split_keeps_tail_for_testing() {
        let ts = TimeSeries::univariate(
            make_weekly_timestamps(10),
            (0..10).map(|i| i as f64).collect(),
        )
        .unwrap();

        let (train, test) = ts.train_test_split(3).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.values(), &[7.0, 8.0, 9.0]);
        assert_eq!(test.timestamps()[0], ts.timestamps()[7]);

        let (train, test) = ts.train_test_split(0).unwrap();
        assert_eq!(train.len(), 10);
        assert!(test.is_empty());

        assert!(ts.train_test_split(11).is_err());
    }

    #[test]
    fn scaled_divides_values() {
        let ts = TimeSeries::univariate(make_weekly_timestamps(3), vec![120.0, 240.0, 90.0])
            .unwrap();
        let scaled = ts.scaled(1000.0).unwrap();
        assert_relative_eq!(scaled.values()[0], 0.12);
        assert_relative_eq!(scaled.values()[1], 0.24);
        assert_relative_eq!(scaled.values()[2], 0.09);

        assert!(ts.scaled(0.0).is_err());
        assert!(ts.scaled(f64::NAN).is_err());
    }

    #[test]
    fn time_series_sanitizes_missing_values() {
        let values = vec![1.0, f64::NAN, 3.0, f64::INFINITY, 5.0];
        let ts = TimeSeries::univariate(make_weekly_timestamps(5), values).unwrap();
        assert!(ts.has_missing_values());

        assert_eq!(
            ts.sanitized(MissingValuePolicy::Error).unwrap_err(),
            ForecastError::MissingValues
        );

        let dropped = ts.sanitized(MissingValuePolicy::Drop).unwrap();
        assert_eq!(dropped.values(), &[1.0, 3.0, 5.0]);
        assert_eq!(dropped.timestamps()[1], ts.timestamps()[2]);

        let filled = ts.sanitized(MissingValuePolicy::Fill(0.0)).unwrap();
        assert_eq!(filled.values(), &[1.0, 0.0, 3.0, 0.0, 5.0]);

        let ffilled = ts.sanitized(MissingValuePolicy::ForwardFill).unwrap();
        assert_eq!(ffilled.values(), &[1.0, 1.0, 3.0, 3.0, 5.0]);

        let interpolated = ts.sanitized(MissingValuePolicy::Interpolate).unwrap();
        assert_eq!(interpolated.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn interpolation_fills_edges_with_nearest_value() {
        let result = interpolate_series(&[f64::NAN, 2.0, f64::NAN, f64::NAN, 8.0, f64::NAN]);
        assert_eq!(result, vec![2.0, 2.0, 4.0, 6.0, 8.0, 8.0]);

        let all_missing = interpolate_series(&[f64::NAN, f64::NAN]);
        assert!(all_missing.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn infers_weekly_frequency() {
        let mut timestamps = make_weekly_timestamps(10);
        // One irregular gap
        timestamps[9] = timestamps[8] + Duration::days(8);
        let ts = TimeSeries::univariate(timestamps, vec![1.0; 10]).unwrap();

        assert_eq!(ts.infer_frequency(0.5).unwrap(), Duration::weeks(1));
        assert!(matches!(
            ts.infer_frequency(0.95),
            Err(ForecastError::FrequencyInference(_))
        ));
    }

    #[test]
    fn frequency_inference_needs_two_points() {
        let ts = TimeSeries::univariate(make_weekly_timestamps(1), vec![1.0]).unwrap();
        assert_eq!(
            ts.infer_frequency(0.5).unwrap_err(),
            ForecastError::InsufficientData { needed: 2, got: 1 }
        );
    }

    #[test]
    fn future_timestamps_follow_frequency() {
        let mut ts = TimeSeries::univariate(make_weekly_timestamps(4), vec![1.0; 4]).unwrap();
        assert!(ts.future_timestamps(2).is_err());

        ts.set_frequency_from_timestamps().unwrap();
        let future = ts.future_timestamps(2).unwrap();
        assert_eq!(future.len(), 2);
        assert_eq!(future[0], ts.timestamps()[3] + Duration::weeks(1));
        assert_eq!(future[1], ts.timestamps()[3] + Duration::weeks(2));
    }

    #[test]
    fn future_timestamps_past_calendar_range_are_errors() {
        let timestamps = [2000, 52000, 102000]
            .iter()
            .map(|&y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap())
            .collect();
        let mut ts = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]).unwrap();
        ts.set_frequency_from_timestamps().unwrap();

        assert_eq!(ts.future_timestamps(2).unwrap().len(), 2);
        assert!(matches!(
            ts.future_timestamps(4),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn step_count_beyond_i32_is_an_error() {
        let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            step_timestamps(last, Duration::seconds(1), i32::MAX as usize + 1),
            Err(ForecastError::TimestampError(_))
        ));
        assert!(step_timestamps(last, Duration::days(1), 0).unwrap().is_empty());
    }
}
