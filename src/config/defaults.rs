//! System-wide default constants.
//!
//! Centralises the heuristic thresholds used across the analyzers. Every
//! value here is a tunable default surfaced through `AnalysisConfig`.

// ============================================================================
// Resampling
// ============================================================================

/// Uniform grid spacing (ms). 60 000 = one value per minute.
pub const RESAMPLE_INTERVAL_MS: i64 = 60_000;

// ============================================================================
// Periodicity
// ============================================================================

/// Number of spectral / autocorrelation peaks reported.
pub const PEAK_COUNT: usize = 5;

/// Longest autocorrelation lag searched (minutes). 480 = 8 hours.
pub const ACF_MAX_LAG_MINUTES: f64 = 480.0;

// ============================================================================
// Transition Clustering
// ============================================================================

/// Number of load signatures (k-means clusters).
pub const CLUSTER_COUNT: usize = 5;

/// Minimum rising step treated as a load turning on (W).
pub const MIN_DELTA_WATTS: f64 = 50.0;

/// Fixed number of k-means refinement passes.
pub const CLUSTER_ITERATIONS: usize = 20;

/// Membership tolerance as a fraction of the centroid.
///
/// `|delta - c| < c * TOLERANCE_FRACTION + TOLERANCE_FLOOR_WATTS`
pub const TOLERANCE_FRACTION: f64 = 0.15;

/// Fixed part of the membership tolerance (W).
pub const TOLERANCE_FLOOR_WATTS: f64 = 30.0;

/// A load counts as still on while the value stays at or above
/// `value_at_transition + centroid * ON_LEVEL_FRACTION`.
pub const ON_LEVEL_FRACTION: f64 = 0.5;

/// Follow window for group linkage (samples). 60 = one hour at 1/min.
pub const LINK_WINDOW_SAMPLES: usize = 60;

/// Fraction of leader events that must be followed to report a link.
pub const LINK_FRACTION: f64 = 0.3;

// ============================================================================
// Thermal Correlation
// ============================================================================

/// Samples after a transition over which the temperature delta is measured.
pub const THERMAL_LOOKAHEAD_SAMPLES: usize = 10;

/// Only groups at or above this centroid are thermally correlated (W).
pub const THERMAL_MIN_GROUP_WATTS: f64 = 2_000.0;

/// Minimum mean temperature rise for sensor attribution (°F).
pub const THERMAL_ATTRIBUTION_FLOOR: f64 = 0.1;

// ============================================================================
// Element Health
// ============================================================================

/// Nominal supply voltage for water-heater elements (V, US split phase).
pub const NOMINAL_VOLTAGE: f64 = 240.0;

/// Approximate household baseload subtracted before banding (W).
pub const BASELOAD_WATTS: f64 = 1_000.0;

/// Net power band of the lower element (W, ~3.8 kW).
pub const LOWER_ELEMENT_BAND_WATTS: [f64; 2] = [3_000.0, 4_200.0];

/// Net power band of the upper element (W, ~4.5 kW).
pub const UPPER_ELEMENT_BAND_WATTS: [f64; 2] = [4_201.0, 5_500.0];

/// Cycles shorter than this are treated as noise (samples).
pub const MIN_CYCLE_SAMPLES: usize = 3;

/// Samples after cycle end searched for the peak temperature (sensor lag).
pub const THERMAL_LAG_SAMPLES: usize = 10;

/// Lower-minus-upper resistance above which a mismatch is flagged (Ω).
pub const RESISTANCE_MISMATCH_OHMS: f64 = 1.5;

/// Lower/upper efficiency ratio below which thermal coupling is suspect.
pub const EFFICIENCY_LOW_RATIO: f64 = 0.85;

/// Lower/upper efficiency ratio above which the result is anomalous.
pub const EFFICIENCY_HIGH_RATIO: f64 = 1.15;

// ============================================================================
// Cycle Intervals
// ============================================================================

/// Half-width of the indoor-temperature peak window (raw samples).
pub const PEAK_WINDOW_SAMPLES: usize = 20;

/// Indoor temperature a heating overshoot must exceed (°F).
pub const MIN_PEAK_TEMPERATURE_F: f64 = 70.0;

/// Minimum spacing between accepted peaks (ms). 600 000 = 10 min.
pub const MIN_PEAK_SEPARATION_MS: i64 = 600_000;

/// |r| above which an interval/outdoor correlation is called strong.
pub const STRONG_CORRELATION: f64 = 0.5;

// ============================================================================
// Load Signatures
// ============================================================================

/// Width of a power histogram bucket (W).
pub const SIGNATURE_BUCKET_WATTS: f64 = 100.0;

/// Number of most frequent buckets reported.
pub const SIGNATURE_TOP_BUCKETS: usize = 5;

// ============================================================================
// Tank / Element Physics
// ============================================================================

/// Tank capacity (US gallons).
pub const TANK_VOLUME_GALLONS: f64 = 50.0;

/// Mass of one gallon of water (lb).
pub const LBS_PER_GALLON: f64 = 8.34;

/// Specific heat of water (BTU / lb·°F).
pub const SPECIFIC_HEAT_WATER: f64 = 1.0;

/// Energy conversion (BTU per Wh).
pub const BTU_PER_WH: f64 = 3.412_14;

/// Sheath area of a standard high-watt-density element (in²).
pub const SURFACE_AREA_HWD_SQ_IN: f64 = 35.0;

/// Sheath area of a folded low-watt-density element (in²).
pub const SURFACE_AREA_LWD_SQ_IN: f64 = 75.0;

/// HWD density above which mineral scaling accelerates (W/in²).
pub const HWD_SCALING_DENSITY: f64 = 100.0;

/// LWD density below which dry-firing risk is low (W/in²).
pub const LWD_SAFE_DENSITY: f64 = 65.0;

/// Temperature rise used for the recovery-time estimate (°F).
pub const RECOVERY_TARGET_F: f64 = 20.0;

/// Energy per smart-meter pulse (Wh, Kh = 1.0).
pub const WH_PER_METER_PULSE: f64 = 1.0;

// ============================================================================
// Acquisition
// ============================================================================

/// Bounded request timeout for HTTP sources (seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 10;
