//! Radix-2 FFT and spectral periodicity detection
//!
//! Cycling loads (refrigerator compressors, furnace burners, tank heaters)
//! leave narrow peaks in the power spectrum. This module provides an iterative
//! Cooley–Tukey transform with a pre-planned twiddle table and a detector that
//! maps spectral peaks back to cycle periods in minutes.
//!
//! # Example
//!
//! ```ignore
//! use loadscope::processing::spectral_analysis;
//!
//! let series = resample(&power_samples, 60_000);
//! let periods = spectral_analysis(&series.values, series.interval_minutes(), 5)?;
//! ```

use num_complex::Complex;
use std::f64::consts::PI;

use super::DegenerateInput;
use crate::types::PeriodicityCandidate;

/// Lowest frequency bins ignored by the peak search (DC and multi-hour trends).
pub const LOW_FREQUENCY_BINS_SKIPPED: usize = 3;

// ============================================================================
// FFT Processor (pre-planned for repeated use)
// ============================================================================

/// In-place radix-2 FFT for a fixed power-of-two length.
///
/// Twiddle factors and the bit-reversal permutation are computed once so
/// repeated transforms of the same size allocate nothing.
#[derive(Debug, Clone)]
pub struct FftProcessor {
    size: usize,
    twiddles: Vec<Complex<f64>>,
    bit_reverse: Vec<usize>,
}

impl FftProcessor {
    /// Plan a transform of `size` points. `size` must be a non-zero power of two.
    pub fn new(size: usize) -> Result<Self, DegenerateInput> {
        if size == 0 || !size.is_power_of_two() {
            return Err(DegenerateInput::NotPowerOfTwo(size));
        }

        let twiddles = (0..size / 2)
            .map(|k| Complex::from_polar(1.0, -2.0 * PI * k as f64 / size as f64))
            .collect();

        let bits = size.trailing_zeros();
        let bit_reverse = if bits == 0 {
            vec![0]
        } else {
            (0..size)
                .map(|i| i.reverse_bits() >> (usize::BITS - bits))
                .collect()
        };

        Ok(Self {
            size,
            twiddles,
            bit_reverse,
        })
    }

    /// Transform length.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Forward transform, `X[k] = Σ x[n]·exp(-2πikn/N)`, unnormalised.
    pub fn forward(&self, buffer: &mut [Complex<f64>]) -> Result<(), DegenerateInput> {
        self.check_len(buffer)?;
        let n = self.size;

        for i in 0..n {
            let j = self.bit_reverse[i];
            if j > i {
                buffer.swap(i, j);
            }
        }

        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let stride = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let w = self.twiddles[k * stride];
                    let u = buffer[start + k];
                    let t = w * buffer[start + k + half];
                    buffer[start + k] = u + t;
                    buffer[start + k + half] = u - t;
                }
            }
            len <<= 1;
        }

        Ok(())
    }

    /// Inverse transform scaled by `1/N`, so `inverse(forward(x)) == x`.
    pub fn inverse(&self, buffer: &mut [Complex<f64>]) -> Result<(), DegenerateInput> {
        self.check_len(buffer)?;
        for c in buffer.iter_mut() {
            *c = c.conj();
        }
        self.forward(buffer)?;
        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c = c.conj() * scale;
        }
        Ok(())
    }

    fn check_len(&self, buffer: &[Complex<f64>]) -> Result<(), DegenerateInput> {
        if buffer.len() == self.size {
            Ok(())
        } else {
            Err(DegenerateInput::LengthMismatch {
                expected: self.size,
                actual: buffer.len(),
            })
        }
    }
}

// ============================================================================
// Spectral Analysis
// ============================================================================

/// Zero-pad `values` to the next power of two and remove the mean of the
/// unpadded values from every slot.
///
/// The padding slots end up at `-mean`; the resulting leakage is accepted.
pub fn detrended_padded(values: &[f64]) -> Vec<Complex<f64>> {
    let padded_len = values.len().next_power_of_two();
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;

    values
        .iter()
        .copied()
        .chain(std::iter::repeat(0.0))
        .take(padded_len)
        .map(|v| Complex::new(v - mean, 0.0))
        .collect()
}

/// Magnitude spectrum (first half of the bins) of a mean-removed, zero-padded signal.
///
/// Returns `(padded_len, magnitudes)`.
pub fn magnitude_spectrum(values: &[f64]) -> Result<(usize, Vec<f64>), DegenerateInput> {
    if values.is_empty() {
        return Err(DegenerateInput::Empty);
    }

    let mut buffer = detrended_padded(values);
    let processor = FftProcessor::new(buffer.len())?;
    processor.forward(&mut buffer)?;

    let magnitudes = buffer
        .iter()
        .take(processor.size() / 2)
        .map(|c| c.norm())
        .collect();

    Ok((processor.size(), magnitudes))
}

/// Detect dominant cycle periods in a uniformly sampled series.
///
/// A bin `i >= LOW_FREQUENCY_BINS_SKIPPED` is a peak when its magnitude
/// strictly exceeds both neighbours; it maps to a period of
/// `padded_len * interval_minutes / i`. The `peak_count` strongest peaks are
/// returned, strongest first.
pub fn spectral_analysis(
    values: &[f64],
    interval_minutes: f64,
    peak_count: usize,
) -> Result<Vec<PeriodicityCandidate>, DegenerateInput> {
    if interval_minutes <= 0.0 || !interval_minutes.is_finite() {
        return Err(DegenerateInput::InvalidInterval(interval_minutes));
    }

    let (padded_len, magnitudes) = magnitude_spectrum(values)?;
    let mut peaks = find_spectral_peaks(&magnitudes, padded_len, interval_minutes);
    peaks.truncate(peak_count);

    tracing::debug!(
        samples = values.len(),
        padded_len,
        peaks = peaks.len(),
        "spectral analysis complete"
    );

    Ok(peaks)
}

/// All local maxima above the skipped low-frequency bins, strongest first.
pub fn find_spectral_peaks(
    magnitudes: &[f64],
    padded_len: usize,
    interval_minutes: f64,
) -> Vec<PeriodicityCandidate> {
    let mut peaks: Vec<PeriodicityCandidate> = Vec::new();

    for i in LOW_FREQUENCY_BINS_SKIPPED..magnitudes.len().saturating_sub(1) {
        let curr = magnitudes[i];
        if curr > magnitudes[i - 1] && curr > magnitudes[i + 1] {
            peaks.push(PeriodicityCandidate {
                period_minutes: padded_len as f64 * interval_minutes / i as f64,
                strength: curr,
            });
        }
    }

    peaks.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    peaks
}

// ============================================================================
// Tests
// ============================================================================
