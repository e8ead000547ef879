//! Hour-of-day load profile

use chrono::{TimeZone, Timelike};

use crate::types::{HourlyLoad, Sample};

/// Mean power per local hour of day in `tz`, ascending by hour.
///
/// Hours without samples are omitted. Timestamps that do not map to a local
/// time are skipped.
pub fn hourly_profile<Tz: TimeZone>(samples: &[Sample], tz: &Tz) -> Vec<HourlyLoad> {
    let mut sums = [0.0f64; 24];
    let mut counts = [0usize; 24];
    let mut skipped = 0usize;

    for s in samples {
        match tz.timestamp_millis_opt(s.timestamp_ms).earliest() {
            Some(dt) => {
                let h = dt.hour() as usize;
                sums[h] += s.value;
                counts[h] += 1;
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "samples with unmappable timestamps left out of diurnal profile");
    }

    (0u32..24)
        .zip(sums.iter().zip(counts.iter()))
        .filter(|(_, (_, &count))| count > 0)
        .map(|(hour, (&sum, &count))| HourlyLoad {
            hour,
            mean_watts: sum / count as f64,
            samples: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    const HOUR: i64 = 3_600_000;

    #[test]
    fn test_buckets_by_utc_hour() {
        let samples = [
            Sample::new(0, 100.0),
            Sample::new(HOUR / 2, 300.0),
            Sample::new(5 * HOUR, 1000.0),
            Sample::new(24 * HOUR + 5 * HOUR, 2000.0),
        ];
        let profile = hourly_profile(&samples, &Utc);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].hour, 0);
        assert!((profile[0].mean_watts - 200.0).abs() < 1e-12);
        assert_eq!(profile[1].hour, 5);
        assert_eq!(profile[1].samples, 2);
        assert!((profile[1].mean_watts - 1500.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_shifts_hours() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let profile = hourly_profile(&[Sample::new(23 * HOUR, 50.0)], &tz);
        assert_eq!(profile[0].hour, 1);
    }

    #[test]
    fn test_system_local_time_keeps_every_sample() {
        // Spans a full week so any DST transition in the host zone is crossed
        let samples: Vec<Sample> = (0..7 * 24)
            .map(|h| Sample::new(1_699_999_200_000 + h * HOUR, 500.0))
            .collect();
        let profile = hourly_profile(&samples, &chrono::Local);
        assert_eq!(profile.iter().map(|h| h.samples).sum::<usize>(), samples.len());
        assert!(profile.iter().all(|h| h.hour < 24));
        assert!(profile.iter().all(|h| (h.mean_watts - 500.0).abs() < 1e-12));
    }

    #[test]
    fn test_empty_profile() {
        assert!(hourly_profile(&[], &Utc).is_empty());
    }
}
