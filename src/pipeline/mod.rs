//! Analysis pipeline
//!
//! ```text
//! STAGE 1: Resample power and every temperature sensor onto one interval
//! STAGE 2: Spectral | Transition clustering | Autocorrelation  (rayon::join)
//! STAGE 3: Group linkage
//! STAGE 4: Thermal correlation and sensor attribution
//! ```
//!
//! Degenerate input never aborts a run: the affected stage yields an empty
//! result and a [`Diagnostic`] is attached to the report.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::processing::{
    acf_analysis, attribute_sensor, cluster_transitions, correlate_groups, link_groups, resample,
    spectral_analysis, DegenerateInput,
};
use crate::types::{
    Diagnostic, GroupLink, LoadGroup, PeriodicityCandidate, Sample, ThermalResponse, UniformSeries,
};

// ============================================================================
// Report
// ============================================================================

/// Shape of the resampled power series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub raw_samples: usize,
    pub samples: usize,
    pub start_timestamp_ms: i64,
    pub interval_ms: i64,
    pub span_minutes: f64,
}

impl SeriesSummary {
    fn new(raw_samples: usize, series: &UniformSeries) -> Self {
        Self {
            raw_samples,
            samples: series.len(),
            start_timestamp_ms: series.start_timestamp_ms,
            interval_ms: series.interval_ms,
            span_minutes: series.len() as f64 * series.interval_minutes(),
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub series: SeriesSummary,
    /// FFT periodicities, strongest first
    pub spectral: Vec<PeriodicityCandidate>,
    /// Autocorrelation periodicities, highest `r` first
    pub acf: Vec<PeriodicityCandidate>,
    /// Load groups in ascending centroid order
    pub groups: Vec<LoadGroup>,
    pub links: Vec<GroupLink>,
    /// Responses of every large group on every sensor
    pub thermal: Vec<ThermalResponse>,
    /// The coupled sensor per group, where one stands out
    pub attributions: Vec<ThermalResponse>,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Parameterized resample → {spectral, cluster, acf} → thermal pipeline.
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage over one power feed and any number of named
    /// temperature sensors.
    pub fn run(&self, power: &[Sample], sensors: &[(String, Vec<Sample>)]) -> PipelineReport {
        let cfg = &self.config;
        let mut diagnostics = Vec::new();

        // STAGE 1
        let series = resample(power, cfg.resample.interval_ms);
        let summary = SeriesSummary::new(power.len(), &series);
        info!(
            raw = power.len(),
            resampled = series.len(),
            interval_ms = cfg.resample.interval_ms,
            "power series resampled"
        );

        if series.is_empty() {
            warn!("power series is empty after resampling");
            diagnostics.push(Diagnostic::warning(
                "Power series is empty; no analysis performed",
            ));
            return PipelineReport {
                series: summary,
                spectral: Vec::new(),
                acf: Vec::new(),
                groups: Vec::new(),
                links: Vec::new(),
                thermal: Vec::new(),
                attributions: Vec::new(),
                diagnostics,
            };
        }

        // STAGE 2
        let values = series.values.as_slice();
        let interval_minutes = series.interval_minutes();
        let (spectral, (groups, acf)) = rayon::join(
            || spectral_analysis(values, interval_minutes, cfg.spectral.peak_count),
            || {
                rayon::join(
                    || cluster_transitions(values, &cfg.clustering),
                    || {
                        acf_analysis(
                            values,
                            interval_minutes,
                            cfg.acf.max_lag_minutes,
                            cfg.acf.peak_count,
                        )
                    },
                )
            },
        );

        let spectral = recover("Spectral analysis", spectral, &mut diagnostics);
        let acf = recover("Autocorrelation", acf, &mut diagnostics);

        if groups.is_empty() {
            diagnostics.push(Diagnostic::info(format!(
                "No rising transitions above {:.0} W",
                cfg.clustering.min_delta_watts
            )));
        }

        // STAGE 3
        let links = link_groups(
            &groups,
            cfg.clustering.link_window_samples,
            cfg.clustering.link_fraction,
        );
        debug!(groups = groups.len(), links = links.len(), "clustering complete");

        // STAGE 4
        let (thermal, attributions) = self.thermal_stage(&series, &groups, sensors, &mut diagnostics);

        info!(
            spectral_peaks = spectral.len(),
            acf_peaks = acf.len(),
            groups = groups.len(),
            attributions = attributions.len(),
            diagnostics = diagnostics.len(),
            "pipeline complete"
        );

        PipelineReport {
            series: summary,
            spectral,
            acf,
            groups,
            links,
            thermal,
            attributions,
            diagnostics,
        }
    }

    fn thermal_stage(
        &self,
        power: &UniformSeries,
        groups: &[LoadGroup],
        sensors: &[(String, Vec<Sample>)],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Vec<ThermalResponse>, Vec<ThermalResponse>) {
        if sensors.is_empty() || groups.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let cfg = &self.config;
        let mut resampled: Vec<(String, UniformSeries)> = sensors
            .iter()
            .map(|(name, samples)| (name.clone(), resample(samples, cfg.resample.interval_ms)))
            .filter(|(name, series)| {
                if series.is_empty() {
                    diagnostics.push(Diagnostic::notice(format!(
                        "Sensor '{name}' has no data; excluded from thermal correlation"
                    )));
                }
                !series.is_empty()
            })
            .collect();

        if resampled.is_empty() {
            return (Vec::new(), Vec::new());
        }

        for (name, series) in &resampled {
            let offset = (series.start_timestamp_ms - power.start_timestamp_ms).abs();
            if offset >= power.interval_ms {
                diagnostics.push(Diagnostic::notice(format!(
                    "Sensor '{name}' starts {:.1} min away from the power feed; responses may be skewed",
                    offset as f64 / 60_000.0
                )));
            }
        }

        let common = resampled
            .iter()
            .map(|(_, s)| s.len())
            .fold(power.len(), usize::min);
        for (_, series) in &mut resampled {
            series.truncate(common);
        }
        debug!(sensors = resampled.len(), common_len = common, "temperature series aligned");

        let temps: Vec<(String, Vec<f64>)> = resampled
            .into_iter()
            .map(|(name, series)| (name, series.values))
            .collect();

        let responses = correlate_groups(
            groups,
            &temps,
            cfg.thermal.lookahead_samples,
            cfg.thermal.min_group_watts,
        );

        let mut attributions = Vec::new();
        for group in 0..groups.len() {
            let group_responses: Vec<ThermalResponse> = responses
                .iter()
                .filter(|r| r.group == group)
                .cloned()
                .collect();
            if group_responses.is_empty() {
                continue;
            }
            match attribute_sensor(&group_responses, cfg.thermal.attribution_floor) {
                Some(best) => attributions.push(best.clone()),
                None => debug!(group, "no sensor attributed"),
            }
        }

        (responses, attributions)
    }
}

/// Turn a degenerate-input error into an empty result and a diagnostic.
fn recover<T>(
    stage: &str,
    result: Result<Vec<T>, DegenerateInput>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<T> {
    match result {
        Ok(values) => values,
        Err(e) => {
            warn!(stage, error = %e, "stage skipped");
            diagnostics.push(Diagnostic::notice(format!("{stage}: {e}")));
            Vec::new()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as i64 * 60_000, v))
            .collect()
    }

    #[test]
    fn test_empty_power_yields_diagnostic() {
        let report = Pipeline::new(AnalysisConfig::default()).run(&[], &[]);
        assert_eq!(report.series.samples, 0);
        assert!(report.groups.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn test_constant_power_reports_constant_signal() {
        let power = minutes(&[500.0; 64]);
        let report = Pipeline::new(AnalysisConfig::default()).run(&power, &[]);

        assert!(report.acf.is_empty());
        assert!(report.groups.is_empty());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("constant signal")));
    }

    #[test]
    fn test_thermal_attribution_picks_heated_sensor() {
        // 4000 W element cycling every 40 minutes, on for 10
        let power: Vec<f64> = (0..240)
            .map(|i| if i % 40 >= 10 && i % 40 < 20 { 4500.0 } else { 500.0 })
            .collect();
        let heated: Vec<f64> = (0..240)
            .map(|i| {
                let phase = i % 40;
                if phase >= 10 && phase < 20 {
                    110.0 + (phase - 10) as f64
                } else {
                    110.0
                }
            })
            .collect();
        let idle = vec![120.0; 240];

        let sensors = vec![
            ("upper".to_string(), minutes(&heated)),
            ("lower".to_string(), minutes(&idle)),
        ];
        let report = Pipeline::new(AnalysisConfig::default()).run(&minutes(&power), &sensors);

        assert_eq!(report.groups.len(), 1, "one 4000 W group expected: {:?}", report.groups);
        assert_eq!(report.attributions.len(), 1);
        assert_eq!(report.attributions[0].sensor, "upper");
        assert!(report.attributions[0].mean_delta > 5.0);
    }

    #[test]
    fn test_empty_sensor_is_reported() {
        let power: Vec<f64> = (0..120)
            .map(|i| if i % 30 < 10 { 3000.0 } else { 300.0 })
            .collect();
        let sensors = vec![("upper".to_string(), Vec::new())];
        let report = Pipeline::new(AnalysisConfig::default()).run(&minutes(&power), &sensors);

        assert!(report.thermal.is_empty());
        assert!(report.diagnostics.iter().any(|d| d.message.contains("'upper'")));
    }
}
