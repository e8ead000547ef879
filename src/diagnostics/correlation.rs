//! Pearson correlation with a Student's t significance test
//!
//! Used to relate furnace cycle intervals to outdoor temperature. With a
//! day or two of data there are only a few dozen intervals, so the p-value
//! is reported next to `r` rather than used as a hard filter.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Correlation analysis engine.
pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Pearson correlation coefficient.
    ///
    /// Formula: r = Σ[(xi - x̄)(yi - ȳ)] / sqrt(Σ(xi - x̄)² × Σ(yi - ȳ)²)
    ///
    /// Returns 0 when either side has zero variance or the lengths differ.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.is_empty() {
            return 0.0;
        }

        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let mut num = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (a, b) in x.iter().zip(y) {
            let dx = a - mean_x;
            let dy = b - mean_y;
            num += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let denominator = (var_x * var_y).sqrt();
        if denominator == 0.0 {
            0.0
        } else {
            num / denominator
        }
    }

    /// Two-tailed p-value of `r` over `n` pairs.
    ///
    /// Formula: t = r × sqrt(n-2) / sqrt(1-r²), with n-2 degrees of freedom.
    pub fn p_value_for_r(r: f64, n: usize) -> f64 {
        if n < 3 {
            return 1.0;
        }

        // Perfect or near-perfect correlation is highly significant
        if r.abs() >= 0.9999 {
            return 0.0;
        }

        let df = (n - 2) as f64;
        let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

        match StudentsT::new(0.0, 1.0, df) {
            Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_stat.abs())),
            Err(_) => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_correlations() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = [10.0, 20.0, 30.0, 40.0, 50.0];
        let down = [50.0, 40.0, 30.0, 20.0, 10.0];
        assert!((CorrelationEngine::pearson(&x, &up) - 1.0).abs() < 1e-12);
        assert!((CorrelationEngine::pearson(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_is_zero() {
        assert_eq!(CorrelationEngine::pearson(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), 0.0);
        assert_eq!(CorrelationEngine::pearson(&[], &[]), 0.0);
        assert_eq!(CorrelationEngine::pearson(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_p_value_ranges() {
        assert_eq!(CorrelationEngine::p_value_for_r(0.5, 2), 1.0);
        assert_eq!(CorrelationEngine::p_value_for_r(1.0, 10), 0.0);

        let weak = CorrelationEngine::p_value_for_r(0.1, 10);
        let strong = CorrelationEngine::p_value_for_r(0.8, 30);
        assert!(weak > 0.5, "weak correlation p = {weak}");
        assert!(strong < 0.001, "strong correlation p = {strong}");
    }
}
