//! Water-heater element upgrade simulation
//!
//! Evaluates candidate replacement elements before buying one: how hard the
//! sheath is loaded (scaling and dry-fire risk), how fast the tank recovers,
//! and how much pulse traffic the smart meter sees while it runs.

use crate::config::TankConfig;
use crate::types::{LayeringBias, Recovery, UpgradeScenario, WattDensity};

/// Watts per square inch on both sheath styles.
pub fn watt_density(watts: f64, tank: &TankConfig) -> WattDensity {
    let hwd = watts / tank.hwd_area_sq_in;
    let lwd = watts / tank.lwd_area_sq_in;
    WattDensity {
        hwd,
        lwd,
        hwd_scaling_risk: hwd > tank.hwd_scaling_density,
        lwd_dry_fire_safe: lwd < tank.lwd_safe_density,
    }
}

/// Whole-tank recovery rate and meter pulse rate for one element.
///
/// `°F/h = W × BTU/Wh ÷ (gallons × lb/gal × specific heat)`
pub fn recovery(watts: f64, tank: &TankConfig) -> Recovery {
    let thermal_mass = tank.volume_gallons * tank.lbs_per_gallon * tank.specific_heat;
    let rate_f_per_hour = watts * tank.btu_per_wh / thermal_mass;
    Recovery {
        rate_f_per_hour,
        minutes_to_target: tank.recovery_target_f / rate_f_per_hour * 60.0,
        meter_pulse_hz: watts / 3600.0 / tank.wh_per_meter_pulse,
    }
}

pub fn layering_bias(upper_watts: f64, lower_watts: f64) -> LayeringBias {
    let diff = upper_watts - lower_watts;
    if diff.abs() < f64::EPSILON {
        LayeringBias::Balanced
    } else if diff > 0.0 {
        LayeringBias::TopRecovery { bias_watts: diff }
    } else {
        LayeringBias::BulkHeating { bias_watts: -diff }
    }
}

/// Evaluate one element wattage; `None` for a non-positive or non-finite
/// wattage.
pub fn simulate(label: impl Into<String>, watts: f64, tank: &TankConfig) -> Option<UpgradeScenario> {
    if !(watts.is_finite() && watts > 0.0) {
        return None;
    }
    Some(UpgradeScenario {
        label: label.into(),
        watts,
        density: watt_density(watts, tank),
        recovery: recovery(watts, tank),
    })
}

/// The standard comparison: keep the measured element, upgrade to a
/// 4500 W low-watt-density element, or downsize to 3500 W.
pub fn standard_scenarios(measured_watts: f64, tank: &TankConfig) -> Vec<UpgradeScenario> {
    [
        ("Keep current element", measured_watts),
        ("Upgrade to 4500 W LWD foldback", 4500.0),
        ("Downsize to 3500 W", 3500.0),
    ]
    .into_iter()
    .filter_map(|(label, watts)| simulate(label, watts, tank))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_4500w_density_flags() {
        let d = watt_density(4500.0, &TankConfig::default());
        assert!((d.hwd - 128.571_428).abs() < 1e-3);
        assert!((d.lwd - 60.0).abs() < 1e-9);
        assert!(d.hwd_scaling_risk);
        assert!(d.lwd_dry_fire_safe);
    }

    #[test]
    fn test_3500w_below_scaling_threshold() {
        let d = watt_density(3500.0, &TankConfig::default());
        assert!(!d.hwd_scaling_risk);
    }

    #[test]
    fn test_recovery_rate() {
        let r = recovery(4500.0, &TankConfig::default());
        // 4500 × 3.41214 / (50 × 8.34)
        assert!((r.rate_f_per_hour - 36.8217).abs() < 1e-3);
        assert!((r.minutes_to_target - 32.59).abs() < 0.01);
        assert!((r.meter_pulse_hz - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_layering_bias() {
        assert_eq!(layering_bias(4500.0, 4500.0), LayeringBias::Balanced);
        assert_eq!(
            layering_bias(4500.0, 3800.0),
            LayeringBias::TopRecovery { bias_watts: 700.0 }
        );
        assert_eq!(
            layering_bias(3500.0, 4500.0),
            LayeringBias::BulkHeating { bias_watts: 1000.0 }
        );
    }

    #[test]
    fn test_invalid_wattage_rejected() {
        let tank = TankConfig::default();
        assert!(simulate("zero", 0.0, &tank).is_none());
        assert!(simulate("nan", f64::NAN, &tank).is_none());
        assert_eq!(standard_scenarios(-1.0, &tank).len(), 2);
        assert_eq!(standard_scenarios(3804.0, &tank).len(), 3);
    }
}
