//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `AnalysisConfig`.
///
/// Maintained by hand to match the struct hierarchy in analysis_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [resample]
        "resample",
        "resample.interval_ms",
        // [spectral]
        "spectral",
        "spectral.peak_count",
        // [clustering]
        "clustering",
        "clustering.k",
        "clustering.min_delta_watts",
        "clustering.iterations",
        "clustering.tolerance_fraction",
        "clustering.tolerance_floor_watts",
        "clustering.on_level_fraction",
        "clustering.link_window_samples",
        "clustering.link_fraction",
        // [acf]
        "acf",
        "acf.max_lag_minutes",
        "acf.peak_count",
        // [thermal]
        "thermal",
        "thermal.lookahead_samples",
        "thermal.min_group_watts",
        "thermal.attribution_floor",
        // [health]
        "health",
        "health.nominal_voltage",
        "health.baseload_watts",
        "health.lower_band_watts",
        "health.upper_band_watts",
        "health.min_cycle_samples",
        "health.thermal_lag_samples",
        "health.resistance_mismatch_ohms",
        "health.efficiency_low_ratio",
        "health.efficiency_high_ratio",
        // [intervals]
        "intervals",
        "intervals.peak_window_samples",
        "intervals.min_peak_temperature_f",
        "intervals.min_peak_separation_ms",
        "intervals.strong_correlation",
        // [signatures]
        "signatures",
        "signatures.bucket_watts",
        "signatures.top_buckets",
        // [tank]
        "tank",
        "tank.volume_gallons",
        "tank.lbs_per_gallon",
        "tank.specific_heat",
        "tank.btu_per_wh",
        "tank.hwd_area_sq_in",
        "tank.lwd_area_sq_in",
        "tank.hwd_scaling_density",
        "tank.lwd_safe_density",
        "tank.recovery_target_f",
        "tank.wh_per_meter_pulse",
        // [sources]
        "sources",
        "sources.power",
        "sources.upper_temp",
        "sources.lower_temp",
        "sources.indoor_temp",
        "sources.outdoor_temp",
        "sources.timeout_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3, ties broken alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|&(dist, _)| dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails: parse errors are reported later by serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `AnalysisConfig`.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent a run; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::AnalysisConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let h = &config.health;

    // Voltage is a divisor base for resistance
    if h.nominal_voltage <= 0.0 {
        errors.push(format!(
            "health.nominal_voltage = {:.1} must be > 0",
            h.nominal_voltage
        ));
    } else if !(100.0..=480.0).contains(&h.nominal_voltage) {
        warnings.push(ValidationWarning {
            field: "health.nominal_voltage".to_string(),
            message: format!(
                "nominal_voltage = {:.1} is outside typical residential range (100-480 V)",
                h.nominal_voltage
            ),
            suggestion: None,
        });
    }

    if h.baseload_watts < 0.0 {
        errors.push(format!(
            "health.baseload_watts = {:.1} cannot be negative",
            h.baseload_watts
        ));
    }
    if h.lower_band_watts[0] < 0.0 || h.upper_band_watts[0] < 0.0 {
        errors.push("health element bands cannot be negative".to_string());
    }

    // Below one second or above one hour defeats cycle detection
    let interval = config.resample.interval_ms;
    if interval > 0 && !(1_000..=3_600_000).contains(&interval) {
        warnings.push(ValidationWarning {
            field: "resample.interval_ms".to_string(),
            message: format!(
                "resample.interval_ms = {interval} is outside typical range (1 s - 1 h)"
            ),
            suggestion: None,
        });
    }

    // Appliance steps above 20 kW are outside a residential service
    let d = config.clustering.min_delta_watts;
    if d > 20_000.0 {
        warnings.push(ValidationWarning {
            field: "clustering.min_delta_watts".to_string(),
            message: format!(
                "min_delta_watts = {d:.0} exceeds a residential service (20 kW); no step will cluster"
            ),
            suggestion: None,
        });
    }

    let tank = config.tank.volume_gallons;
    if tank > 0.0 && !(10.0..=120.0).contains(&tank) {
        warnings.push(ValidationWarning {
            field: "tank.volume_gallons".to_string(),
            message: format!(
                "volume_gallons = {tank:.0} is outside typical residential range (10-120 gal)"
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
