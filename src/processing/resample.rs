//! Uniform resampling by linear interpolation
//!
//! Telemetry arrives with irregular spacing (report-on-change sensors, dropped
//! packets). Every analyzer downstream assumes a fixed sample interval, so raw
//! samples are interpolated onto a regular grid first.

use crate::types::{Sample, UniformSeries};

/// Resample `samples` onto a grid of `interval_ms` starting at the first
/// sample's timestamp.
///
/// The grid stops before the last raw timestamp: no value is extrapolated
/// and the final raw sample only ever acts as an upper interpolation bound.
/// Empty input or a non-positive interval yields an empty series.
pub fn resample(samples: &[Sample], interval_ms: i64) -> UniformSeries {
    let Some(first) = samples.first() else {
        tracing::debug!("resample called with no samples");
        return UniformSeries::empty(0, interval_ms);
    };
    if interval_ms <= 0 {
        tracing::warn!(interval_ms, "non-positive resample interval, returning empty series");
        return UniformSeries::empty(first.timestamp_ms, interval_ms);
    }

    let start_ts = first.timestamp_ms;
    let end_ts = samples[samples.len() - 1].timestamp_ms;
    let last = samples.len() - 1;

    let capacity = usize::try_from((end_ts - start_ts) / interval_ms + 1).unwrap_or(0);
    let mut values = Vec::with_capacity(capacity);

    let mut cursor = start_ts;
    let mut idx = 0usize;

    while cursor < end_ts {
        while idx < last && samples[idx + 1].timestamp_ms < cursor {
            idx += 1;
        }
        if idx >= last {
            break;
        }

        let Sample { timestamp_ms: t1, value: v1 } = samples[idx];
        let Sample { timestamp_ms: t2, value: v2 } = samples[idx + 1];

        let v = if t1 == t2 {
            v1
        } else {
            v1 + (v2 - v1) * (cursor - t1) as f64 / (t2 - t1) as f64
        };
        values.push(v);
        cursor += interval_ms;
    }

    tracing::trace!(
        raw = samples.len(),
        resampled = values.len(),
        interval_ms,
        "resampled series"
    );

    UniformSeries {
        start_timestamp_ms: start_ts,
        interval_ms,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(i64, f64)]) -> Vec<Sample> {
        pairs.iter().copied().map(Sample::from).collect()
    }

    #[test]
    fn test_midpoint_and_dropped_endpoint() {
        let series = resample(&samples(&[(0, 10.0), (2000, 20.0)]), 1000);
        assert_eq!(series.start_timestamp_ms, 0);
        assert_eq!(series.values, vec![10.0, 15.0]);
        assert_eq!(series.timestamp_at(1), 1000);
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        let series = resample(&[], 60_000);
        assert!(series.is_empty());
    }

    #[test]
    fn test_single_sample_gives_empty_series() {
        let series = resample(&samples(&[(5_000, 3.0)]), 1000);
        assert!(series.is_empty());
        assert_eq!(series.start_timestamp_ms, 5_000);
    }

    #[test]
    fn test_non_positive_interval_is_guarded() {
        let series = resample(&samples(&[(0, 1.0), (10, 2.0)]), 0);
        assert!(series.is_empty());
    }

    #[test]
    fn test_duplicate_timestamps_take_first_value() {
        let series = resample(&samples(&[(0, 5.0), (0, 7.0), (2000, 9.0)]), 1000);
        assert_eq!(series.values.len(), 2);
        assert!((series.values[0] - 5.0).abs() < 1e-12);
        // Pointer has moved onto (0, 7.0) -> (2000, 9.0)
        assert!((series.values[1] - 8.0).abs() < 1e-12);
        assert!(series.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_values_bounded_by_neighbours() {
        let raw = samples(&[
            (0, 100.0),
            (1_700, 40.0),
            (2_300, 40.0),
            (5_100, 900.0),
            (9_000, 120.0),
        ]);
        let series = resample(&raw, 250);

        for (ts, v) in series.iter_timestamped() {
            let seg = raw
                .windows(2)
                .find(|w| w[0].timestamp_ms <= ts && ts < w[1].timestamp_ms)
                .expect("cursor lies inside a raw segment");
            let lo = seg[0].value.min(seg[1].value);
            let hi = seg[0].value.max(seg[1].value);
            assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "value {v} at {ts} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_never_extends_past_last_sample() {
        let raw = samples(&[(0, 1.0), (999, 2.0), (4_321, 3.0)]);
        let series = resample(&raw, 1000);
        let end = series.end_timestamp_ms().expect("non-empty");
        assert!(end <= 4_321);
        assert_eq!(series.len(), 5);
    }
}
