//! Analysis Configuration - every analyzer threshold as a TOML value
//!
//! Each section implements `Default` from `config::defaults`, so a missing
//! file or a partial file behaves exactly like the built-in tuning.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "LOADSCOPE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "loadscope.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis run.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. An explicit path (the `--config` flag)
/// 2. `$LOADSCOPE_CONFIG`
/// 3. `./loadscope.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub resample: ResampleConfig,
    pub spectral: SpectralConfig,
    pub clustering: ClusteringConfig,
    pub acf: AcfConfig,
    pub thermal: ThermalConfig,
    pub health: HealthConfig,
    pub intervals: IntervalsConfig,
    pub signatures: SignatureConfig,
    pub tank: TankConfig,
    pub sources: SourcesConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path that fails to load is reported and skipped, like the
    /// environment variable; only the defaults are guaranteed.
    pub fn load(explicit: Option<&Path>) -> Self {
        // 1. Explicit path
        if let Some(p) = explicit {
            match Self::load_from_file(p) {
                Ok(config) => {
                    info!(path = %p.display(), "Loaded analysis config");
                    return config;
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "Failed to load config file, falling back");
                }
            }
        }

        // 2. Env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analysis config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 3. ./loadscope.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analysis config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 4. Defaults
        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Unknown keys only warn; parse and validation failures are errors.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check internal consistency.
    ///
    /// Rules:
    /// - Counts, intervals and divisors must be positive
    /// - Fractions must lie in their unit ranges
    /// - Element power bands must be ordered and must not overlap
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.resample.interval_ms <= 0 {
            errors.push(format!(
                "resample.interval_ms must be > 0 (got {})",
                self.resample.interval_ms
            ));
        }
        if self.spectral.peak_count == 0 {
            errors.push("spectral.peak_count must be > 0".to_string());
        }

        let c = &self.clustering;
        if c.k == 0 {
            errors.push("clustering.k must be > 0".to_string());
        }
        if c.iterations == 0 {
            errors.push("clustering.iterations must be > 0".to_string());
        }
        if c.min_delta_watts < 0.0 {
            errors.push("clustering.min_delta_watts cannot be negative".to_string());
        }
        if c.tolerance_fraction < 0.0 || c.tolerance_floor_watts < 0.0 {
            errors.push("clustering tolerance terms cannot be negative".to_string());
        }
        Self::check_fraction(c.on_level_fraction, "clustering.on_level_fraction", &mut errors);
        Self::check_fraction(c.link_fraction, "clustering.link_fraction", &mut errors);
        if c.link_window_samples == 0 {
            errors.push("clustering.link_window_samples must be > 0".to_string());
        }

        if self.acf.max_lag_minutes <= 0.0 {
            errors.push("acf.max_lag_minutes must be > 0".to_string());
        }
        if self.acf.peak_count == 0 {
            errors.push("acf.peak_count must be > 0".to_string());
        }

        if self.thermal.lookahead_samples == 0 {
            errors.push("thermal.lookahead_samples must be > 0".to_string());
        }

        let h = &self.health;
        Self::check_band(h.lower_band_watts, "health.lower_band_watts", &mut errors);
        Self::check_band(h.upper_band_watts, "health.upper_band_watts", &mut errors);
        if h.lower_band_watts[1] >= h.upper_band_watts[0] {
            errors.push(format!(
                "health.lower_band_watts ({:.0}-{:.0}) must sit below upper_band_watts ({:.0}-{:.0})",
                h.lower_band_watts[0],
                h.lower_band_watts[1],
                h.upper_band_watts[0],
                h.upper_band_watts[1]
            ));
        }
        if h.efficiency_low_ratio >= h.efficiency_high_ratio {
            errors.push(format!(
                "health.efficiency_low_ratio ({:.2}) must be < efficiency_high_ratio ({:.2})",
                h.efficiency_low_ratio, h.efficiency_high_ratio
            ));
        }

        if self.intervals.peak_window_samples == 0 {
            errors.push("intervals.peak_window_samples must be > 0".to_string());
        }
        if self.signatures.bucket_watts <= 0.0 {
            errors.push("signatures.bucket_watts must be > 0".to_string());
        }

        let t = &self.tank;
        if t.volume_gallons <= 0.0 || t.lbs_per_gallon <= 0.0 || t.specific_heat <= 0.0 {
            errors.push("tank volume, density and specific heat must be > 0 (used as divisors)".to_string());
        }
        if t.hwd_area_sq_in <= 0.0 || t.lwd_area_sq_in <= 0.0 {
            errors.push("tank element areas must be > 0 (used as divisors)".to_string());
        }
        if t.wh_per_meter_pulse <= 0.0 {
            errors.push("tank.wh_per_meter_pulse must be > 0".to_string());
        }

        if self.sources.timeout_secs == 0 {
            errors.push("sources.timeout_secs must be > 0".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        // NaN/Inf comparisons silently pass, so sweep all floats via serialization
        if let Ok(value) = toml::Value::try_from(self) {
            if has_non_finite(&value) {
                errors.push("Config contains NaN or Inf values; all thresholds must be finite numbers".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_fraction(value: f64, name: &str, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} must be within 0-1 (got {value})"));
        }
    }

    fn check_band(band: [f64; 2], name: &str, errors: &mut Vec<String>) {
        if band[0] > band[1] {
            errors.push(format!(
                "{name}: lower bound ({:.0}) must be <= upper bound ({:.0})",
                band[0], band[1]
            ));
        }
    }
}

fn has_non_finite(value: &toml::Value) -> bool {
    match value {
        toml::Value::Float(f) => !f.is_finite(),
        toml::Value::Array(items) => items.iter().any(has_non_finite),
        toml::Value::Table(table) => table.values().any(has_non_finite),
        _ => false,
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Resampling / Periodicity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Grid spacing in milliseconds
    pub interval_ms: i64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            interval_ms: defaults::RESAMPLE_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    pub peak_count: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            peak_count: defaults::PEAK_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcfConfig {
    /// Longest lag searched (minutes)
    pub max_lag_minutes: f64,
    pub peak_count: usize,
}

impl Default for AcfConfig {
    fn default() -> Self {
        Self {
            max_lag_minutes: defaults::ACF_MAX_LAG_MINUTES,
            peak_count: defaults::PEAK_COUNT,
        }
    }
}

// ============================================================================
// Transition Clustering
// ============================================================================

/// Tuning for the transition clusterer and group linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Number of clusters
    pub k: usize,
    /// Rising steps at or below this are not clustered (W)
    pub min_delta_watts: f64,
    /// Fixed k-means pass count
    pub iterations: usize,
    pub tolerance_fraction: f64,
    pub tolerance_floor_watts: f64,
    /// On-level threshold as a fraction of the centroid
    pub on_level_fraction: f64,
    pub link_window_samples: usize,
    pub link_fraction: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: defaults::CLUSTER_COUNT,
            min_delta_watts: defaults::MIN_DELTA_WATTS,
            iterations: defaults::CLUSTER_ITERATIONS,
            tolerance_fraction: defaults::TOLERANCE_FRACTION,
            tolerance_floor_watts: defaults::TOLERANCE_FLOOR_WATTS,
            on_level_fraction: defaults::ON_LEVEL_FRACTION,
            link_window_samples: defaults::LINK_WINDOW_SAMPLES,
            link_fraction: defaults::LINK_FRACTION,
        }
    }
}

// ============================================================================
// Thermal Correlation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    pub lookahead_samples: usize,
    /// Groups below this centroid are not correlated (W)
    pub min_group_watts: f64,
    /// Minimum mean rise to attribute a group to a sensor
    pub attribution_floor: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            lookahead_samples: defaults::THERMAL_LOOKAHEAD_SAMPLES,
            min_group_watts: defaults::THERMAL_MIN_GROUP_WATTS,
            attribution_floor: defaults::THERMAL_ATTRIBUTION_FLOOR,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Water-heater element health thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub nominal_voltage: f64,
    pub baseload_watts: f64,
    /// `[min, max]` net power of the lower element (W)
    pub lower_band_watts: [f64; 2],
    /// `[min, max]` net power of the upper element (W)
    pub upper_band_watts: [f64; 2],
    pub min_cycle_samples: usize,
    pub thermal_lag_samples: usize,
    pub resistance_mismatch_ohms: f64,
    pub efficiency_low_ratio: f64,
    pub efficiency_high_ratio: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            nominal_voltage: defaults::NOMINAL_VOLTAGE,
            baseload_watts: defaults::BASELOAD_WATTS,
            lower_band_watts: defaults::LOWER_ELEMENT_BAND_WATTS,
            upper_band_watts: defaults::UPPER_ELEMENT_BAND_WATTS,
            min_cycle_samples: defaults::MIN_CYCLE_SAMPLES,
            thermal_lag_samples: defaults::THERMAL_LAG_SAMPLES,
            resistance_mismatch_ohms: defaults::RESISTANCE_MISMATCH_OHMS,
            efficiency_low_ratio: defaults::EFFICIENCY_LOW_RATIO,
            efficiency_high_ratio: defaults::EFFICIENCY_HIGH_RATIO,
        }
    }
}

/// Furnace cycle interval detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalsConfig {
    pub peak_window_samples: usize,
    pub min_peak_temperature_f: f64,
    pub min_peak_separation_ms: i64,
    pub strong_correlation: f64,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            peak_window_samples: defaults::PEAK_WINDOW_SAMPLES,
            min_peak_temperature_f: defaults::MIN_PEAK_TEMPERATURE_F,
            min_peak_separation_ms: defaults::MIN_PEAK_SEPARATION_MS,
            strong_correlation: defaults::STRONG_CORRELATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub bucket_watts: f64,
    pub top_buckets: usize,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            bucket_watts: defaults::SIGNATURE_BUCKET_WATTS,
            top_buckets: defaults::SIGNATURE_TOP_BUCKETS,
        }
    }
}

/// Tank and element constants for the upgrade simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    pub volume_gallons: f64,
    pub lbs_per_gallon: f64,
    pub specific_heat: f64,
    pub btu_per_wh: f64,
    pub hwd_area_sq_in: f64,
    pub lwd_area_sq_in: f64,
    pub hwd_scaling_density: f64,
    pub lwd_safe_density: f64,
    pub recovery_target_f: f64,
    pub wh_per_meter_pulse: f64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            volume_gallons: defaults::TANK_VOLUME_GALLONS,
            lbs_per_gallon: defaults::LBS_PER_GALLON,
            specific_heat: defaults::SPECIFIC_HEAT_WATER,
            btu_per_wh: defaults::BTU_PER_WH,
            hwd_area_sq_in: defaults::SURFACE_AREA_HWD_SQ_IN,
            lwd_area_sq_in: defaults::SURFACE_AREA_LWD_SQ_IN,
            hwd_scaling_density: defaults::HWD_SCALING_DENSITY,
            lwd_safe_density: defaults::LWD_SAFE_DENSITY,
            recovery_target_f: defaults::RECOVERY_TARGET_F,
            wh_per_meter_pulse: defaults::WH_PER_METER_PULSE,
        }
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Default telemetry locations (file paths or `http(s)://` URLs).
///
/// Command-line arguments take precedence over these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub power: Option<String>,
    pub upper_temp: Option<String>,
    pub lower_temp: Option<String>,
    pub indoor_temp: Option<String>,
    pub outdoor_temp: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            power: None,
            upper_temp: None,
            lower_temp: None,
            indoor_temp: None,
            outdoor_temp: None,
            timeout_secs: defaults::FETCH_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AnalysisConfig::default()
            .validate()
            .expect("built-in defaults must be valid");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
[clustering]
k = 3

[thermal]
lookahead_samples = 15
"#,
        )
        .unwrap();
        assert_eq!(config.clustering.k, 3);
        assert_eq!(config.thermal.lookahead_samples, 15);
        assert_eq!(config.clustering.min_delta_watts, defaults::MIN_DELTA_WATTS);
        assert_eq!(config.resample.interval_ms, defaults::RESAMPLE_INTERVAL_MS);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalysisConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AnalysisConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = AnalysisConfig::default();
        config.resample.interval_ms = 0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("resample.interval_ms")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut config = AnalysisConfig::default();
        config.health.lower_band_watts = [3_000.0, 4_800.0];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lower_band_watts"));
    }

    #[test]
    fn test_nan_rejected() {
        let mut config = AnalysisConfig::default();
        config.thermal.attribution_floor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[clustering\nk = 3").unwrap();
        let err = AnalysisConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref p, _) if p == &path));
    }

    #[test]
    fn test_load_falls_back_to_defaults_on_bad_explicit_path() {
        let config = AnalysisConfig::load(Some(Path::new("/nonexistent/loadscope.toml")));
        assert_eq!(config.clustering.k, defaults::CLUSTER_COUNT);
    }
}
