//! Processing Property Tests
//!
//! Invariants of the inference core exercised through the public API:
//! interpolation bounds, no extrapolation, FFT reversibility, clustering
//! determinism and ACF bounds, plus the reference scenarios.

use loadscope::config::ClusteringConfig;
use loadscope::processing::{
    acf_analysis, autocorrelation, cluster_transitions, detect_transitions, detrended_padded,
    resample, spectral_analysis, thermal_response, FftProcessor,
};
use loadscope::{DegenerateInput, Sample};
use rand::prelude::*;

fn irregular_samples(seed: u64, count: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ts = 0i64;
    (0..count)
        .map(|_| {
            ts += rng.gen_range(0..5_000);
            Sample::new(ts, rng.gen_range(-500.0..5_000.0))
        })
        .collect()
}

// ============================================================================
// Resampler
// ============================================================================

#[test]
fn interpolated_values_lie_between_bounding_samples() {
    let samples = irregular_samples(11, 400);
    let series = resample(&samples, 1_000);
    assert!(!series.is_empty());

    for (ts, value) in series.iter_timestamped() {
        // Last raw timestamp before the grid point, first at or after it
        let lo_ts = samples
            .iter()
            .map(|s| s.timestamp_ms)
            .filter(|&t| t < ts)
            .max()
            .unwrap_or(ts);
        let hi_ts = samples
            .iter()
            .map(|s| s.timestamp_ms)
            .filter(|&t| t >= ts)
            .min()
            .expect("grid never passes the last sample");

        let (min, max) = samples
            .iter()
            .filter(|s| (lo_ts..=hi_ts).contains(&s.timestamp_ms))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.value), hi.max(s.value))
            });
        assert!(
            value >= min - 1e-9 && value <= max + 1e-9,
            "value {value} at {ts} outside [{min}, {max}]"
        );
    }
}

#[test]
fn no_grid_point_past_last_sample() {
    for seed in 0..5 {
        let samples = irregular_samples(seed, 200);
        let last = samples.last().map(|s| s.timestamp_ms).unwrap_or_default();
        for interval in [250, 1_000, 7_000] {
            let series = resample(&samples, interval);
            if let Some(end) = series.end_timestamp_ms() {
                assert!(end < last, "grid end {end} at or past last sample {last}");
            }
            assert!(series.values.iter().all(|v| v.is_finite()));
        }
    }
}

#[test]
fn two_point_reference_case() {
    let series = resample(&[Sample::new(0, 10.0), Sample::new(2_000, 20.0)], 1_000);
    assert_eq!(series.values, vec![10.0, 15.0]);
    assert_eq!(series.timestamp_at(1), 1_000);
}

#[test]
fn empty_input_gives_empty_series() {
    assert!(resample(&[], 1_000).is_empty());
}

// ============================================================================
// FFT
// ============================================================================

#[test]
fn inverse_fft_reconstructs_padded_signal() {
    let values: Vec<f64> = (0..100).map(|i| (i as f64 * 0.3).sin() * 200.0 + 50.0).collect();
    let original = detrended_padded(&values);
    assert_eq!(original.len(), 128);

    let fft = FftProcessor::new(original.len()).expect("power of two");
    let mut buffer = original.clone();
    fft.forward(&mut buffer).expect("forward");
    fft.inverse(&mut buffer).expect("inverse");

    for (a, b) in original.iter().zip(&buffer) {
        assert!((a - b).norm() < 1e-9);
    }
}

#[test]
fn spectral_analysis_finds_square_wave_period() {
    // 30-minute cycle, 10 minutes on, sampled each minute for 8 hours
    let values: Vec<f64> = (0..480)
        .map(|i| if i % 30 < 10 { 1_200.0 } else { 200.0 })
        .collect();
    let peaks = spectral_analysis(&values, 1.0, 5).expect("non-empty input");
    let top = peaks.first().expect("a peak");
    // 512-point transform: the fundamental lands on bin 17 (512/17 ≈ 30.1 min)
    assert!((top.period_minutes - 30.0).abs() < 1.0, "top period {}", top.period_minutes);
}

// ============================================================================
// Transition Clusterer
// ============================================================================

#[test]
fn reference_two_pulse_scenario() {
    let values = [0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 0.0, 0.0, 0.0, 100.0, 100.0, 100.0];
    let transitions: Vec<usize> = detect_transitions(&values, 50.0)
        .iter()
        .map(|t| t.index)
        .collect();
    assert_eq!(transitions, vec![2, 8]);

    let groups = cluster_transitions(&values, &ClusteringConfig::default());
    assert_eq!(groups.len(), 1);
    assert!((groups[0].centroid - 100.0).abs() < 1e-9);
    assert!((groups[0].median_period - 6.0).abs() < 1e-9);
}

#[test]
fn clustering_is_deterministic() {
    let samples = irregular_samples(5, 600);
    let values = resample(&samples, 2_000).values;
    let config = ClusteringConfig::default();
    assert_eq!(
        cluster_transitions(&values, &config),
        cluster_transitions(&values, &config)
    );
}

// ============================================================================
// Autocorrelation
// ============================================================================

#[test]
fn acf_coefficients_bounded() {
    let samples = irregular_samples(9, 500);
    let values = resample(&samples, 1_000).values;
    let r = autocorrelation(&values, values.len() / 2).expect("non-constant");
    assert!((r[0] - 1.0).abs() < 1e-12);
    assert!(r.iter().all(|x| x.abs() <= 1.0 + 1e-12));
}

#[test]
fn constant_series_reports_constant_signal() {
    assert_eq!(
        acf_analysis(&[5.0; 5], 1.0, 480.0, 5),
        Err(DegenerateInput::ConstantSignal)
    );
}

// ============================================================================
// Thermal Correlator
// ============================================================================

#[test]
fn thermal_response_ignores_out_of_range_members() {
    let temps = [100.0, 101.0, 103.0, 106.0];
    assert!((thermal_response(&[0, 1, 3], &temps, 2) - 4.0).abs() < 1e-12);
    assert_eq!(thermal_response(&[3], &temps, 2), 0.0);
}
