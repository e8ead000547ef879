//! Raw samples and uniformly resampled series.

use serde::{Deserialize, Serialize};

/// A single telemetry reading as delivered by the acquisition layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Reading in the sensor's native unit (W, °F, ...)
    pub value: f64,
}

impl Sample {
    pub const fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

impl From<(i64, f64)> for Sample {
    fn from((timestamp_ms, value): (i64, f64)) -> Self {
        Self::new(timestamp_ms, value)
    }
}

/// Fixed-interval value sequence produced by the resampler.
///
/// `values[i]` corresponds to `start_timestamp_ms + i * interval_ms`. The
/// series never extends past the last raw sample it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformSeries {
    pub start_timestamp_ms: i64,
    pub interval_ms: i64,
    pub values: Vec<f64>,
}

impl UniformSeries {
    /// An empty series anchored at `start_timestamp_ms`.
    pub const fn empty(start_timestamp_ms: i64, interval_ms: i64) -> Self {
        Self {
            start_timestamp_ms,
            interval_ms,
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Timestamp of the value at `index`.
    pub fn timestamp_at(&self, index: usize) -> i64 {
        self.start_timestamp_ms + index as i64 * self.interval_ms
    }

    /// Timestamp of the last value, if any.
    pub fn end_timestamp_ms(&self) -> Option<i64> {
        self.values
            .len()
            .checked_sub(1)
            .map(|last| self.timestamp_at(last))
    }

    /// Sample spacing in minutes.
    pub fn interval_minutes(&self) -> f64 {
        self.interval_ms as f64 / 60_000.0
    }

    /// Iterate `(timestamp_ms, value)` pairs.
    pub fn iter_timestamped(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.timestamp_at(i), v))
    }

    /// Keep only the first `len` values.
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_follow_interval() {
        let series = UniformSeries {
            start_timestamp_ms: 1_000,
            interval_ms: 60_000,
            values: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(series.timestamp_at(2), 121_000);
        assert_eq!(series.end_timestamp_ms(), Some(121_000));
        assert!((series.interval_minutes() - 1.0).abs() < 1e-12);

        let pairs: Vec<_> = series.iter_timestamped().collect();
        assert_eq!(pairs[1], (61_000, 2.0));
    }

    #[test]
    fn test_empty_series_has_no_end() {
        let series = UniformSeries::empty(0, 1_000);
        assert!(series.is_empty());
        assert_eq!(series.end_timestamp_ms(), None);
    }
}
