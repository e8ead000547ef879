//! Furnace cycle intervals against outdoor temperature
//!
//! Each furnace run overshoots the thermostat setpoint, leaving a local
//! maximum in the indoor temperature. The gap between consecutive maxima is
//! one heating cycle; in cold weather the house loses heat faster and the
//! gap should shrink.

use statrs::statistics::{Data, Median, Statistics};

use super::CorrelationEngine;
use crate::config::IntervalsConfig;
use crate::types::{CorrelationClass, CycleInterval, Diagnostic, IntervalReport, Sample};

/// Raw samples that are the maximum of their `±window` neighbourhood, exceed
/// `min_value`, and come more than `min_separation_ms` after the previous
/// accepted peak.
///
/// On a plateau the first sample wins; the rest fall inside the separation.
pub fn find_peaks(
    samples: &[Sample],
    window: usize,
    min_value: f64,
    min_separation_ms: i64,
) -> Vec<Sample> {
    let mut peaks: Vec<Sample> = Vec::new();
    if samples.len() <= 2 * window {
        return peaks;
    }

    for i in window..samples.len() - window {
        let candidate = samples[i];
        let dominated = samples[i - window..=i + window]
            .iter()
            .any(|s| s.value > candidate.value);
        if dominated || candidate.value <= min_value {
            continue;
        }

        let separated = peaks
            .last()
            .map_or(true, |p| candidate.timestamp_ms - p.timestamp_ms > min_separation_ms);
        if separated {
            peaks.push(candidate);
        }
    }

    peaks
}

/// Median outdoor temperature in `[start_ms, end_ms]`, `None` without samples.
pub fn median_between(samples: &[Sample], start_ms: i64, end_ms: i64) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| (start_ms..=end_ms).contains(&s.timestamp_ms))
        .map(|s| s.value)
        .collect();
    (!values.is_empty()).then(|| Data::new(values).median())
}

pub fn classify(r: f64, strong: f64) -> CorrelationClass {
    if r < -strong {
        CorrelationClass::StrongNegative
    } else if r > strong {
        CorrelationClass::StrongPositive
    } else {
        CorrelationClass::Weak
    }
}

/// Peak-to-peak intervals of the indoor temperature, each paired with the
/// median outdoor temperature over the same span.
pub fn cycle_intervals(
    indoor: &[Sample],
    outdoor: &[Sample],
    config: &IntervalsConfig,
) -> IntervalReport {
    let peaks = find_peaks(
        indoor,
        config.peak_window_samples,
        config.min_peak_temperature_f,
        config.min_peak_separation_ms,
    );
    tracing::debug!(indoor = indoor.len(), peaks = peaks.len(), "indoor peaks detected");

    let mut diagnostics = Vec::new();
    let intervals: Vec<CycleInterval> = peaks
        .windows(2)
        .filter_map(|w| {
            let (start, end) = (w[0].timestamp_ms, w[1].timestamp_ms);
            Some(CycleInterval {
                start_timestamp_ms: start,
                end_timestamp_ms: end,
                interval_minutes: (end - start) as f64 / 60_000.0,
                median_outdoor_f: median_between(outdoor, start, end)?,
            })
        })
        .collect();

    if peaks.len() < 2 {
        diagnostics.push(Diagnostic::notice(format!(
            "Not enough furnace cycle peaks to measure intervals ({} detected)",
            peaks.len()
        )));
    } else if intervals.len() < peaks.len() - 1 {
        diagnostics.push(Diagnostic::info(format!(
            "{} interval(s) skipped: no outdoor samples in range",
            peaks.len() - 1 - intervals.len()
        )));
    }

    let minutes: Vec<f64> = intervals.iter().map(|i| i.interval_minutes).collect();
    let outdoor_medians: Vec<f64> = intervals.iter().map(|i| i.median_outdoor_f).collect();

    let (mean_interval_minutes, mean_outdoor_f) = if intervals.is_empty() {
        (None, None)
    } else {
        (Some(minutes.iter().mean()), Some(outdoor_medians.iter().mean()))
    };

    let (correlation, p_value, classification) = if intervals.len() >= 2 {
        let r = CorrelationEngine::pearson(&minutes, &outdoor_medians);
        let class = classify(r, config.strong_correlation);
        diagnostics.push(Diagnostic::info(class.to_string()));
        (
            Some(r),
            Some(CorrelationEngine::p_value_for_r(r, intervals.len())),
            Some(class),
        )
    } else {
        (None, None, None)
    };

    IntervalReport {
        peaks_ms: peaks.iter().map(|p| p.timestamp_ms).collect(),
        intervals,
        mean_interval_minutes,
        mean_outdoor_f,
        correlation,
        p_value,
        classification,
        diagnostics,
    }
}
