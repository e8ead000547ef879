//! Autocorrelation periodicity analysis
//!
//! Complements the spectral detector: a load that cycles every 45 minutes
//! correlates strongly with a copy of itself shifted by 45 minutes, even when
//! its duty cycle spreads FFT energy across many harmonics.

use super::DegenerateInput;
use crate::types::PeriodicityCandidate;

/// Autocorrelation below this is never reported as a peak.
pub const ACF_SIGNIFICANCE_FLOOR: f64 = 0.1;

/// Normalised autocorrelation `r(0..=max_lag)` of the mean-centred signal.
///
/// `r(lag) = Σ v[i]·v[i+lag] / Σ v[i]²`, so `r(0) == 1` and `|r| <= 1`.
/// `max_lag` is clamped to `len - 1`.
pub fn autocorrelation(values: &[f64], max_lag: usize) -> Result<Vec<f64>, DegenerateInput> {
    let Some(&first) = values.first() else {
        return Err(DegenerateInput::Empty);
    };
    if values.iter().all(|&v| v == first) {
        return Err(DegenerateInput::ConstantSignal);
    }

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let denom: f64 = centred.iter().map(|v| v * v).sum();
    if denom <= 0.0 {
        return Err(DegenerateInput::ConstantSignal);
    }

    let max_lag = max_lag.min(n - 1);
    let r = (0..=max_lag)
        .map(|lag| {
            let num: f64 = centred
                .iter()
                .zip(&centred[lag..])
                .map(|(a, b)| a * b)
                .sum();
            num / denom
        })
        .collect();

    Ok(r)
}

/// Detect cycle periods from local maxima of the autocorrelation.
///
/// Lags run up to `min(N/2, max_lag_minutes / interval_minutes)`. A lag is a
/// peak when `r` strictly exceeds both neighbours and the significance
/// floor. The `peak_count` highest peaks are returned, highest first, with
/// `strength` holding the correlation coefficient.
pub fn acf_analysis(
    values: &[f64],
    interval_minutes: f64,
    max_lag_minutes: f64,
    peak_count: usize,
) -> Result<Vec<PeriodicityCandidate>, DegenerateInput> {
    if interval_minutes <= 0.0 || !interval_minutes.is_finite() {
        return Err(DegenerateInput::InvalidInterval(interval_minutes));
    }

    let lag_window = (max_lag_minutes / interval_minutes).floor().max(0.0) as usize;
    let max_lag = (values.len() / 2).min(lag_window);
    let r = autocorrelation(values, max_lag)?;

    let mut peaks: Vec<PeriodicityCandidate> = (2..r.len().saturating_sub(1))
        .filter(|&lag| {
            r[lag] > r[lag - 1] && r[lag] > r[lag + 1] && r[lag] > ACF_SIGNIFICANCE_FLOOR
        })
        .map(|lag| PeriodicityCandidate {
            period_minutes: lag as f64 * interval_minutes,
            strength: r[lag],
        })
        .collect();

    peaks.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    peaks.truncate(peak_count);

    tracing::debug!(
        samples = values.len(),
        max_lag,
        peaks = peaks.len(),
        "autocorrelation analysis complete"
    );

    Ok(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_constant_signal_is_degenerate() {
        assert_eq!(
            acf_analysis(&[5.0, 5.0, 5.0, 5.0, 5.0], 1.0, 480.0, 5),
            Err(DegenerateInput::ConstantSignal)
        );
    }

    #[test]
    fn test_empty_is_degenerate() {
        assert_eq!(acf_analysis(&[], 1.0, 480.0, 5), Err(DegenerateInput::Empty));
    }

    #[test]
    fn test_coefficients_bounded() {
        let values: Vec<f64> = (0..300)
            .map(|i| ((i * 7919) % 113) as f64 + (i as f64 * 0.2).sin() * 30.0)
            .collect();
        let r = autocorrelation(&values, 150).unwrap();
        assert!((r[0] - 1.0).abs() < 1e-12);
        for (lag, v) in r.iter().enumerate() {
            assert!(v.abs() <= 1.0 + 1e-12, "r({lag}) = {v}");
        }
    }

    #[test]
    fn test_sine_period_found() {
        let values: Vec<f64> = (0..600)
            .map(|i| (2.0 * PI * i as f64 / 60.0).sin() * 500.0 + 800.0)
            .collect();
        let peaks = acf_analysis(&values, 1.0, 480.0, 5).unwrap();
        assert!(!peaks.is_empty());
        assert!(
            (peaks[0].period_minutes - 60.0).abs() <= 1.0,
            "expected ~60 min, got {}",
            peaks[0].period_minutes
        );
        assert!(peaks.iter().all(|p| p.strength > ACF_SIGNIFICANCE_FLOOR));
        assert!(peaks.iter().all(|p| p.period_minutes <= 300.0));
    }

    #[test]
    fn test_lag_reported_in_minutes() {
        // Period of 12 samples at a 5-minute interval
        let values: Vec<f64> = (0..240).map(|i| if i % 12 < 4 { 1.0 } else { 0.0 }).collect();
        let peaks = acf_analysis(&values, 5.0, 480.0, 5).unwrap();
        assert!((peaks[0].period_minutes - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_lag_window_gives_no_peaks() {
        let values: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        // max lag of 2 samples leaves no interior lag to test
        let peaks = acf_analysis(&values, 1.0, 2.0, 5).unwrap();
        assert!(peaks.is_empty());
    }
}
