//! Diagnostic types: Severity, Diagnostic, element health, cycle intervals,
//! diurnal profile, load signatures and upgrade scenarios

use serde::{Deserialize, Serialize};

// ============================================================================
// Advisory Messages
// ============================================================================

/// How much attention a diagnostic deserves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info = 0,
    Notice = 1,
    Warning = 2,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "[*]"),
            Severity::Notice => write!(f, "[?]"),
            Severity::Warning => write!(f, "[!]"),
        }
    }
}

/// A human-readable note attached to a result: degenerate input, a skipped
/// stage, or an interpretation of the numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Notice,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.severity, self.message)
    }
}

// ============================================================================
// Element Health
// ============================================================================

/// Water-heater element position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Element {
    Upper,
    Lower,
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Upper => write!(f, "Upper Element"),
            Element::Lower => write!(f, "Lower Element"),
        }
    }
}

/// One contiguous run of samples attributed to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingCycle {
    /// First on sample
    pub start: usize,
    /// First sample after the run (exclusive)
    pub end: usize,
    /// Gross energy over the run (Wh)
    pub energy_wh: f64,
    /// Peak temperature in the lag window minus the starting temperature (°F)
    pub thermal_rise: f64,
    /// °F per Wh, 0 when no energy was measured
    pub efficiency: f64,
    /// Mean power minus baseload (W)
    pub net_power_watts: f64,
    /// `V² / net_power`, absent when net power is not positive
    pub resistance_ohms: Option<f64>,
}

/// Aggregated health metrics for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementMetrics {
    pub element: Element,
    pub cycle_count: usize,
    /// Mean implied resistance (Ω); absent when no cycle had positive net power
    pub mean_resistance_ohms: Option<f64>,
    /// Mean °F per Wh
    pub mean_efficiency: f64,
    pub cycles: Vec<HeatingCycle>,
}

/// Interpretation of the lower-vs-upper comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HealthFinding {
    /// Lower element impedance well above the upper's (mineral scaling)
    ResistanceMismatch { delta_ohms: f64 },
    /// Lower element heats its sensor poorly (sediment insulation)
    ThermalCouplingIssue { ratio: f64 },
    /// Lower element looks more efficient than the upper (sensor placement)
    AnomalousEfficiency { ratio: f64 },
    /// Both elements transfer heat to their sensors alike
    UniformEfficiency { ratio: f64 },
}

impl HealthFinding {
    pub const fn severity(&self) -> Severity {
        match self {
            HealthFinding::ResistanceMismatch { .. } | HealthFinding::ThermalCouplingIssue { .. } => {
                Severity::Warning
            }
            HealthFinding::AnomalousEfficiency { .. } => Severity::Notice,
            HealthFinding::UniformEfficiency { .. } => Severity::Info,
        }
    }
}

impl std::fmt::Display for HealthFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthFinding::ResistanceMismatch { delta_ohms } => write!(
                f,
                "Resistance mismatch: lower element impedance is {delta_ohms:+.2} Ω above the upper; likely severe mineral scaling"
            ),
            HealthFinding::ThermalCouplingIssue { ratio } => write!(
                f,
                "Thermal coupling issue: lower element heats its sensor at {:.0}% of the upper; likely sediment build-up",
                ratio * 100.0
            ),
            HealthFinding::AnomalousEfficiency { ratio } => write!(
                f,
                "Anomalous efficiency: lower element appears {:.0}% as effective as the upper; check sensor proximity",
                ratio * 100.0
            ),
            HealthFinding::UniformEfficiency { ratio } => write!(
                f,
                "Uniform efficiency: heat transfer is consistent across both elements ({:.0}%)",
                ratio * 100.0
            ),
        }
    }
}

/// Lower-vs-upper comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementComparison {
    /// `R_lower - R_upper` (Ω), when both resistances are known
    pub resistance_delta_ohms: Option<f64>,
    /// `E_lower / E_upper`, absent when the upper efficiency is zero
    pub efficiency_ratio: Option<f64>,
    pub findings: Vec<HealthFinding>,
}

/// Full element health result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub lower: Option<ElementMetrics>,
    pub upper: Option<ElementMetrics>,
    pub comparison: Option<ElementComparison>,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Cycle Intervals
// ============================================================================

/// Time between two consecutive indoor-temperature overshoot peaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleInterval {
    pub start_timestamp_ms: i64,
    pub end_timestamp_ms: i64,
    pub interval_minutes: f64,
    /// Median outdoor temperature over `[start, end]` (°F)
    pub median_outdoor_f: f64,
}

/// Sign and strength of the interval/outdoor-temperature relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationClass {
    /// Intervals grow as it gets colder (unexpected)
    StrongNegative,
    /// Intervals shrink as it gets colder: the furnace cycles more often
    StrongPositive,
    /// Other factors dominate at this timescale
    Weak,
}

impl std::fmt::Display for CorrelationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationClass::StrongNegative => write!(
                f,
                "Strong negative correlation (unexpected): cycle intervals grow as it gets colder"
            ),
            CorrelationClass::StrongPositive => write!(
                f,
                "Strong positive correlation: as outdoor temperature drops, the furnace cycles more often"
            ),
            CorrelationClass::Weak => write!(
                f,
                "Weak or no correlation: solar gain or internal loads may dominate"
            ),
        }
    }
}

/// Cycle interval analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalReport {
    /// Timestamps of accepted indoor-temperature peaks
    pub peaks_ms: Vec<i64>,
    pub intervals: Vec<CycleInterval>,
    pub mean_interval_minutes: Option<f64>,
    pub mean_outdoor_f: Option<f64>,
    /// Pearson r between interval and outdoor temperature (needs two intervals)
    pub correlation: Option<f64>,
    /// Two-tailed p-value of `correlation`
    pub p_value: Option<f64>,
    pub classification: Option<CorrelationClass>,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Diurnal Profile
// ============================================================================

/// Mean power for one local hour of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyLoad {
    /// 0-23
    pub hour: u32,
    pub mean_watts: f64,
    pub samples: usize,
}

// ============================================================================
// Load Signatures
// ============================================================================

/// Share of samples falling in one power bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBucket {
    /// Bucket lower bound (W)
    pub floor_watts: i64,
    /// Bucket width (W)
    pub width_watts: i64,
    /// Fraction of the segment's samples (0-1)
    pub ratio: f64,
}

/// Power statistics for the samples on one side of a regime shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub samples: usize,
    /// Minimum power, taken as the baseload (W)
    pub baseload_watts: f64,
    pub peak_watts: f64,
    pub mean_watts: f64,
    pub top_buckets: Vec<PowerBucket>,
}

/// Temperature statistics for one side of a regime shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub mean_f: f64,
    pub min_f: f64,
    pub max_f: f64,
}

/// Before/after comparison around the largest temperature jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureReport {
    pub shift_timestamp_ms: i64,
    /// Absolute size of the temperature jump (°F)
    pub shift_magnitude: f64,
    /// Hours between the earliest sample and the shift
    pub hours_into_record: f64,
    pub power_before: Option<SegmentStats>,
    pub power_after: Option<SegmentStats>,
    pub temperature_before: Option<TemperatureStats>,
    pub temperature_after: Option<TemperatureStats>,
}

// ============================================================================
// Element Upgrade Simulation
// ============================================================================

/// Surface loading of an element at a given wattage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WattDensity {
    /// W/in² on a standard high-watt-density sheath
    pub hwd: f64,
    /// W/in² on a folded low-watt-density sheath
    pub lwd: f64,
    /// HWD density is high enough to bake minerals onto the sheath
    pub hwd_scaling_risk: bool,
    /// LWD density is low enough to tolerate some sediment
    pub lwd_dry_fire_safe: bool,
}

/// Recovery and metering impact of an element at a given wattage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    pub rate_f_per_hour: f64,
    /// Minutes to raise the whole tank by the recovery target
    pub minutes_to_target: f64,
    /// Smart-meter pulses per second while the element runs
    pub meter_pulse_hz: f64,
}

/// One element wattage under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeScenario {
    pub label: String,
    pub watts: f64,
    pub density: WattDensity,
    pub recovery: Recovery,
}

/// Which element dominates a non-simultaneous tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayeringBias {
    Balanced,
    /// Upper element larger: fast shower recovery
    TopRecovery { bias_watts: f64 },
    /// Lower element larger: efficient bulk maintenance, more sediment stress
    BulkHeating { bias_watts: f64 },
}

impl std::fmt::Display for LayeringBias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayeringBias::Balanced => write!(f, "Balanced: simultaneous recovery potential is uniform"),
            LayeringBias::TopRecovery { bias_watts } => {
                write!(f, "Fast top-recovery: {bias_watts:.0} W bias toward the upper element")
            }
            LayeringBias::BulkHeating { bias_watts } => {
                write!(f, "Bulk-heating bias: {bias_watts:.0} W toward the lower element")
            }
        }
    }
}
