//! Water-heater element health
//!
//! A non-simultaneous electric tank runs either its upper or its lower
//! element, each with a distinct wattage. Banding the net power separates the
//! two, and each heating cycle then gives an implied resistance (`V²/P`) and
//! a thermal efficiency (°F gained at the element's sensor per Wh drawn).
//! A scaled element shows a raised resistance; a sediment-buried one shows
//! poor efficiency relative to its partner.

use tracing::debug;

use crate::config::HealthConfig;
use crate::types::{
    Diagnostic, Element, ElementComparison, ElementMetrics, HealthFinding, HealthReport,
    HeatingCycle,
};

/// Contiguous runs where `band[0] <= p - baseload <= band[1]`, as
/// `(start, end_exclusive)`. A run still open at the last sample is dropped.
pub fn extract_cycles(power: &[f64], band: [f64; 2], baseload: f64) -> Vec<(usize, usize)> {
    let mut cycles = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &p) in power.iter().enumerate() {
        let net = p - baseload;
        let on = band[0] <= net && net <= band[1];
        match (on, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                cycles.push((s, i));
                start = None;
            }
            _ => {}
        }
    }

    cycles
}

/// Energy, thermal rise, efficiency and resistance for each qualifying cycle.
///
/// `power` and `temps` share one grid. Cycles shorter than
/// `min_cycle_samples` are noise and are skipped.
pub fn measure_cycles(
    power: &[f64],
    temps: &[f64],
    cycles: &[(usize, usize)],
    interval_minutes: f64,
    config: &HealthConfig,
) -> Vec<HeatingCycle> {
    cycles
        .iter()
        .filter(|(start, end)| end - start >= config.min_cycle_samples)
        .filter_map(|&(start, end)| {
            let run = power.get(start..end)?;
            let t_start = *temps.get(start)?;
            let lag_end = (end + config.thermal_lag_samples).min(temps.len().checked_sub(1)?);
            let t_peak = temps
                .get(end..=lag_end)
                .filter(|w| !w.is_empty())?
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);

            let total: f64 = run.iter().sum();
            let energy_wh = total * interval_minutes / 60.0;
            let thermal_rise = t_peak - t_start;
            let efficiency = if energy_wh > 0.0 {
                thermal_rise / energy_wh
            } else {
                0.0
            };

            let net_power_watts = total / run.len() as f64 - config.baseload_watts;
            let resistance_ohms = (net_power_watts > 0.0)
                .then(|| config.nominal_voltage * config.nominal_voltage / net_power_watts);

            Some(HeatingCycle {
                start,
                end,
                energy_wh,
                thermal_rise,
                efficiency,
                net_power_watts,
                resistance_ohms,
            })
        })
        .collect()
}

/// Aggregate metrics for one element; `None` when no cycle qualified.
pub fn element_metrics(
    element: Element,
    power: &[f64],
    temps: &[f64],
    interval_minutes: f64,
    config: &HealthConfig,
) -> Option<ElementMetrics> {
    let band = match element {
        Element::Upper => config.upper_band_watts,
        Element::Lower => config.lower_band_watts,
    };

    let runs = extract_cycles(power, band, config.baseload_watts);
    let cycles = measure_cycles(power, temps, &runs, interval_minutes, config);
    debug!(%element, runs = runs.len(), qualifying = cycles.len(), "element cycles extracted");

    if cycles.is_empty() {
        return None;
    }

    let mean_efficiency = cycles.iter().map(|c| c.efficiency).sum::<f64>() / cycles.len() as f64;
    let resistances: Vec<f64> = cycles.iter().filter_map(|c| c.resistance_ohms).collect();
    let mean_resistance_ohms = (!resistances.is_empty())
        .then(|| resistances.iter().sum::<f64>() / resistances.len() as f64);

    Some(ElementMetrics {
        element,
        cycle_count: cycles.len(),
        mean_resistance_ohms,
        mean_efficiency,
        cycles,
    })
}

/// Compare the lower element against the upper one.
pub fn compare_elements(
    lower: &ElementMetrics,
    upper: &ElementMetrics,
    config: &HealthConfig,
) -> ElementComparison {
    let resistance_delta_ohms = lower
        .mean_resistance_ohms
        .zip(upper.mean_resistance_ohms)
        .map(|(l, u)| l - u);
    let efficiency_ratio =
        (upper.mean_efficiency != 0.0).then(|| lower.mean_efficiency / upper.mean_efficiency);

    let mut findings = Vec::new();
    if let Some(delta) = resistance_delta_ohms {
        if delta > config.resistance_mismatch_ohms {
            findings.push(HealthFinding::ResistanceMismatch { delta_ohms: delta });
        }
    }
    if let Some(ratio) = efficiency_ratio {
        findings.push(if ratio < config.efficiency_low_ratio {
            HealthFinding::ThermalCouplingIssue { ratio }
        } else if ratio > config.efficiency_high_ratio {
            HealthFinding::AnomalousEfficiency { ratio }
        } else {
            HealthFinding::UniformEfficiency { ratio }
        });
    }

    ElementComparison {
        resistance_delta_ohms,
        efficiency_ratio,
        findings,
    }
}

/// Full health check from one power series and the two tank sensors.
///
/// All three series must share one grid; they are trimmed to their common
/// length.
pub fn element_health(
    power: &[f64],
    upper_temps: &[f64],
    lower_temps: &[f64],
    interval_minutes: f64,
    config: &HealthConfig,
) -> HealthReport {
    let len = power.len().min(upper_temps.len()).min(lower_temps.len());
    let (power, upper_temps, lower_temps) = (&power[..len], &upper_temps[..len], &lower_temps[..len]);

    let mut diagnostics = Vec::new();
    let lower = element_metrics(Element::Lower, power, lower_temps, interval_minutes, config);
    let upper = element_metrics(Element::Upper, power, upper_temps, interval_minutes, config);

    for (element, metrics) in [(Element::Lower, &lower), (Element::Upper, &upper)] {
        if metrics.is_none() {
            diagnostics.push(Diagnostic::notice(format!("{element}: no stable cycles detected")));
        }
    }

    let comparison = match (&lower, &upper) {
        (Some(l), Some(u)) => {
            let comparison = compare_elements(l, u, config);
            if comparison.efficiency_ratio.is_none() {
                diagnostics.push(Diagnostic::notice(
                    "Upper element shows zero efficiency; ratio not computed",
                ));
            }
            diagnostics.extend(comparison.findings.iter().map(|f| Diagnostic {
                severity: f.severity(),
                message: f.to_string(),
            }));
            Some(comparison)
        }
        _ => None,
    };

    HealthReport {
        lower,
        upper,
        comparison,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    /// Lower element (3800 W net) on 5..10, upper element (4500 W net) on 20..26.
    fn fixture() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut power = vec![1000.0; 40];
        for p in &mut power[5..10] {
            *p = 4800.0;
        }
        for p in &mut power[20..26] {
            *p = 5500.0;
        }

        let lower: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i.clamp(5, 15) - 5) as f64 * 0.5)
            .collect();
        let upper: Vec<f64> = (0..40)
            .map(|i| 120.0 + (i.clamp(20, 30) - 20) as f64 * 0.55)
            .collect();

        (power, upper, lower)
    }

    #[test]
    fn test_extract_cycles_drops_open_run() {
        let power = [1000.0, 4800.0, 4800.0, 1000.0, 4800.0, 4800.0];
        let cycles = extract_cycles(&power, [3000.0, 4200.0], 1000.0);
        assert_eq!(cycles, vec![(1, 3)]);
    }

    #[test]
    fn test_bands_are_inclusive() {
        let power = [4000.0, 5200.0, 0.0];
        assert_eq!(extract_cycles(&power, [3000.0, 4200.0], 1000.0), vec![(0, 2)]);
    }

    #[test]
    fn test_cycle_measurements() {
        let (power, _, lower) = fixture();
        let config = HealthConfig::default();
        let metrics = element_metrics(Element::Lower, &power, &lower, 1.0, &config).unwrap();

        assert_eq!(metrics.cycle_count, 1);
        let cycle = &metrics.cycles[0];
        assert_eq!((cycle.start, cycle.end), (5, 10));
        assert!((cycle.energy_wh - 400.0).abs() < 1e-9);
        assert!((cycle.thermal_rise - 5.0).abs() < 1e-9);
        assert!((cycle.efficiency - 0.0125).abs() < 1e-12);
        assert!((cycle.net_power_watts - 3800.0).abs() < 1e-9);
        assert!((metrics.mean_resistance_ohms.unwrap() - 57_600.0 / 3800.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_scales_with_interval() {
        let (power, _, lower) = fixture();
        let config = HealthConfig::default();
        let metrics = element_metrics(Element::Lower, &power, &lower, 5.0, &config).unwrap();
        assert!((metrics.cycles[0].energy_wh - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_cycles_are_noise() {
        let mut power = vec![1000.0; 20];
        power[4] = 4800.0;
        power[5] = 4800.0;
        let temps = vec![100.0; 20];
        let report = element_health(&power, &temps, &temps, 1.0, &HealthConfig::default());
        assert!(report.lower.is_none());
        assert!(report.comparison.is_none());
        assert_eq!(report.diagnostics.len(), 2);
    }

    #[test]
    fn test_comparison_findings() {
        let (power, upper, lower) = fixture();
        let report = element_health(&power, &upper, &lower, 1.0, &HealthConfig::default());
        let comparison = report.comparison.expect("both elements measured");

        // R_lower = 15.16, R_upper = 12.8
        let delta = comparison.resistance_delta_ohms.unwrap();
        assert!((delta - (57_600.0 / 3800.0 - 57_600.0 / 4500.0)).abs() < 1e-9);

        // 0.0125 / 0.01
        let ratio = comparison.efficiency_ratio.unwrap();
        assert!((ratio - 1.25).abs() < 1e-9);

        assert!(matches!(comparison.findings[0], HealthFinding::ResistanceMismatch { .. }));
        assert!(matches!(comparison.findings[1], HealthFinding::AnomalousEfficiency { .. }));
        assert!(report.diagnostics.iter().any(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_uniform_efficiency() {
        let config = HealthConfig::default();
        let metrics = |element, r, e| ElementMetrics {
            element,
            cycle_count: 1,
            mean_resistance_ohms: Some(r),
            mean_efficiency: e,
            cycles: Vec::new(),
        };
        let c = compare_elements(
            &metrics(Element::Lower, 13.0, 0.010),
            &metrics(Element::Upper, 12.8, 0.011),
            &config,
        );
        assert_eq!(c.findings.len(), 1);
        assert!(matches!(c.findings[0], HealthFinding::UniformEfficiency { .. }));

        let sediment = compare_elements(
            &metrics(Element::Lower, 13.0, 0.005),
            &metrics(Element::Upper, 12.8, 0.010),
            &config,
        );
        assert!(matches!(sediment.findings[0], HealthFinding::ThermalCouplingIssue { .. }));
    }
}
