//! Load signatures before and after a regime shift
//!
//! Moving a temperature sensor, or a season change in thermostat schedule,
//! shows up as the single largest jump in the temperature record. Splitting
//! the power record at that instant and histogramming each side shows which
//! load levels appeared or disappeared.

use std::collections::BTreeMap;

use crate::config::SignatureConfig;
use crate::types::{PowerBucket, Sample, SegmentStats, SignatureReport, TemperatureStats};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Timestamp and magnitude of the largest absolute sample-to-sample jump.
///
/// With no positive jump the first timestamp is returned with magnitude 0;
/// `None` for an empty record.
pub fn find_regime_shift(temps: &[Sample]) -> Option<(i64, f64)> {
    let first = temps.first()?;
    let mut shift = (first.timestamp_ms, 0.0);

    for w in temps.windows(2) {
        let jump = (w[1].value - w[0].value).abs();
        if jump > shift.1 {
            shift = (w[1].timestamp_ms, jump);
        }
    }

    Some(shift)
}

/// Baseload, peak, mean and most frequent power buckets.
///
/// A bucket is the value truncated toward zero to a multiple of
/// `bucket_watts`. Equal frequencies order by ascending bucket.
pub fn segment_stats(values: &[f64], bucket_watts: f64, top: usize) -> Option<SegmentStats> {
    if values.is_empty() || bucket_watts <= 0.0 {
        return None;
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(((v / bucket_watts).trunc() * bucket_watts) as i64).or_insert(0) += 1;
    }

    let mut ranked: Vec<(i64, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let total = values.len() as f64;
    let width_watts = bucket_watts as i64;
    let top_buckets = ranked
        .into_iter()
        .take(top)
        .map(|(floor_watts, count)| PowerBucket {
            floor_watts,
            width_watts,
            ratio: count as f64 / total,
        })
        .collect();

    Some(SegmentStats {
        samples: values.len(),
        baseload_watts: values.iter().copied().fold(f64::INFINITY, f64::min),
        peak_watts: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean_watts: values.iter().sum::<f64>() / total,
        top_buckets,
    })
}

pub fn temperature_stats(values: &[f64]) -> Option<TemperatureStats> {
    if values.is_empty() {
        return None;
    }
    Some(TemperatureStats {
        mean_f: values.iter().sum::<f64>() / values.len() as f64,
        min_f: values.iter().copied().fold(f64::INFINITY, f64::min),
        max_f: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Split both records at the largest temperature jump and summarise each
/// side. Samples at the shift timestamp belong to the "after" side.
pub fn load_signatures(
    power: &[Sample],
    temps: &[Sample],
    config: &SignatureConfig,
) -> Option<SignatureReport> {
    let (shift_timestamp_ms, shift_magnitude) = find_regime_shift(temps)?;

    let record_start = power
        .first()
        .map_or(temps[0].timestamp_ms, |p| p.timestamp_ms.min(temps[0].timestamp_ms));

    let split = |samples: &[Sample]| -> (Vec<f64>, Vec<f64>) {
        let (before, after): (Vec<&Sample>, Vec<&Sample>) = samples
            .iter()
            .partition(|s| s.timestamp_ms < shift_timestamp_ms);
        (
            before.iter().map(|s| s.value).collect(),
            after.iter().map(|s| s.value).collect(),
        )
    };

    let (power_before, power_after) = split(power);
    let (temp_before, temp_after) = split(temps);

    tracing::debug!(
        shift_timestamp_ms,
        shift_magnitude,
        before = power_before.len(),
        after = power_after.len(),
        "regime shift located"
    );

    Some(SignatureReport {
        shift_timestamp_ms,
        shift_magnitude,
        hours_into_record: (shift_timestamp_ms - record_start) as f64 / MS_PER_HOUR,
        power_before: segment_stats(&power_before, config.bucket_watts, config.top_buckets),
        power_after: segment_stats(&power_after, config.bucket_watts, config.top_buckets),
        temperature_before: temperature_stats(&temp_before),
        temperature_after: temperature_stats(&temp_after),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_shift_is_largest_jump() {
        let temps = [
            Sample::new(0, 68.0),
            Sample::new(10, 68.5),
            Sample::new(20, 61.0),
            Sample::new(30, 60.0),
        ];
        assert_eq!(find_regime_shift(&temps), Some((20, 7.5)));
    }

    #[test]
    fn test_flat_record_shifts_at_start() {
        let temps = [Sample::new(5, 70.0), Sample::new(10, 70.0)];
        assert_eq!(find_regime_shift(&temps), Some((5, 0.0)));
        assert_eq!(find_regime_shift(&[]), None);
    }

    #[test]
    fn test_bucket_ranking() {
        let values = [120.0, 150.0, 199.9, 210.0, 250.0, 4500.0];
        let stats = segment_stats(&values, 100.0, 2).unwrap();
        assert_eq!(stats.baseload_watts, 120.0);
        assert_eq!(stats.peak_watts, 4500.0);
        assert_eq!(stats.top_buckets.len(), 2);
        assert_eq!(stats.top_buckets[0].floor_watts, 100);
        assert!((stats.top_buckets[0].ratio - 0.5).abs() < 1e-12);
        assert_eq!(stats.top_buckets[1].floor_watts, 200);
    }

    #[test]
    fn test_split_at_shift() {
        let power: Vec<Sample> = (0..10).map(|i| Sample::new(i * 10, if i < 5 { 300.0 } else { 900.0 })).collect();
        let temps = [
            Sample::new(0, 70.0),
            Sample::new(40, 70.0),
            Sample::new(50, 62.0),
            Sample::new(90, 62.0),
        ];
        let report = load_signatures(&power, &temps, &SignatureConfig::default()).unwrap();
        assert_eq!(report.shift_timestamp_ms, 50);

        let before = report.power_before.unwrap();
        let after = report.power_after.unwrap();
        assert_eq!(before.samples, 5);
        assert_eq!(after.samples, 5);
        assert!((before.mean_watts - 300.0).abs() < 1e-12);
        assert!((after.mean_watts - 900.0).abs() < 1e-12);

        let t_after = report.temperature_after.unwrap();
        assert!((t_after.mean_f - 62.0).abs() < 1e-12);
    }
}
