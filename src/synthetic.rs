//! Synthetic household telemetry
//!
//! Generates a whole-house power feed plus upper/lower water-heater tank
//! sensors with known ground truth, for the `simulation` binary and for
//! regression tests. The same seed always produces the same telemetry.
//!
//! Loads on the feed:
//! - baseload with Gaussian noise
//! - refrigerator compressor cycle
//! - furnace blower cycle
//! - non-simultaneous water heater: a hot-water draw, then the upper element
//!   recovers the top of the tank, then (after the thermostat hand-off) the
//!   lower element reheats the bulk

use rand::prelude::*;
use rand_distr::{Distribution, Normal, NormalError};
use serde::{Deserialize, Serialize};

use crate::types::Sample;

// ============================================================================
// Household Profile
// ============================================================================

/// A periodic on/off load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclicLoad {
    pub watts: f64,
    pub period_minutes: u32,
    pub on_minutes: u32,
    /// Minutes into the period at which the load turns on
    pub offset_minutes: u32,
}

impl CyclicLoad {
    fn is_on(&self, minute: u32) -> bool {
        if self.period_minutes == 0 {
            return false;
        }
        let phase = (minute + self.period_minutes - self.offset_minutes % self.period_minutes)
            % self.period_minutes;
        phase < self.on_minutes
    }
}

/// Water heater schedule and thermal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterHeaterProfile {
    pub upper_watts: f64,
    pub lower_watts: f64,
    /// Minutes between hot-water draws
    pub draw_period_minutes: u32,
    /// Minutes from the draw until the upper element turns on
    pub draw_to_heat_minutes: u32,
    pub upper_on_minutes: u32,
    /// Idle minutes between the upper element turning off and the lower turning on
    pub handoff_minutes: u32,
    pub lower_on_minutes: u32,
    /// Temperature drop at each sensor caused by a draw (°F)
    pub upper_draw_drop_f: f64,
    pub lower_draw_drop_f: f64,
    pub upper_setpoint_f: f64,
    pub lower_setpoint_f: f64,
    /// Standby loss while idle (°F/min)
    pub standby_loss_f_per_min: f64,
}

impl WaterHeaterProfile {
    const fn cycle_minutes(&self) -> u32 {
        self.draw_to_heat_minutes + self.upper_on_minutes + self.handoff_minutes + self.lower_on_minutes
    }

    fn upper_rate(&self) -> f64 {
        self.upper_draw_drop_f / self.upper_on_minutes.max(1) as f64
    }

    fn lower_rate(&self) -> f64 {
        self.lower_draw_drop_f / self.lower_on_minutes.max(1) as f64
    }
}

/// Everything that shapes one synthetic day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdProfile {
    pub start_timestamp_ms: i64,
    /// Nominal spacing between the per-minute samples (ms); every sample is
    /// jittered around it
    pub interval_ms: i64,
    pub jitter_ms: i64,
    pub baseload_watts: f64,
    pub baseload_noise_watts: f64,
    pub temperature_noise_f: f64,
    pub refrigerator: CyclicLoad,
    pub furnace: CyclicLoad,
    pub water_heater: WaterHeaterProfile,
}

impl Default for HouseholdProfile {
    fn default() -> Self {
        Self {
            start_timestamp_ms: 1_700_000_000_000,
            interval_ms: 60_000,
            jitter_ms: 3_000,
            baseload_watts: 1_000.0,
            baseload_noise_watts: 8.0,
            temperature_noise_f: 0.05,
            refrigerator: CyclicLoad {
                watts: 150.0,
                period_minutes: 50,
                on_minutes: 20,
                offset_minutes: 7,
            },
            furnace: CyclicLoad {
                watts: 400.0,
                period_minutes: 45,
                on_minutes: 12,
                offset_minutes: 21,
            },
            water_heater: WaterHeaterProfile {
                upper_watts: 4_500.0,
                lower_watts: 3_500.0,
                draw_period_minutes: 180,
                draw_to_heat_minutes: 5,
                upper_on_minutes: 15,
                handoff_minutes: 2,
                lower_on_minutes: 30,
                upper_draw_drop_f: 15.0,
                lower_draw_drop_f: 20.0,
                upper_setpoint_f: 125.0,
                lower_setpoint_f: 120.0,
                standby_loss_f_per_min: 0.01,
            },
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// One generated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTelemetry {
    pub power: Vec<Sample>,
    pub upper_temp: Vec<Sample>,
    pub lower_temp: Vec<Sample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaterPhase {
    Idle,
    Upper,
    Lower,
}

fn heater_phase(wh: &WaterHeaterProfile, minute: u32) -> (HeaterPhase, bool) {
    if wh.draw_period_minutes == 0 {
        return (HeaterPhase::Idle, false);
    }
    let phase = minute % wh.draw_period_minutes;
    let draw = phase == 0;

    let upper_start = wh.draw_to_heat_minutes;
    let upper_end = upper_start + wh.upper_on_minutes;
    let lower_start = upper_end + wh.handoff_minutes;
    let lower_end = lower_start + wh.lower_on_minutes;

    let state = if (upper_start..upper_end).contains(&phase) {
        HeaterPhase::Upper
    } else if (lower_start..lower_end).contains(&phase) {
        HeaterPhase::Lower
    } else {
        HeaterPhase::Idle
    };
    (state, draw)
}

/// Generate `minutes` of telemetry from `profile` with a fixed seed.
///
/// Fails only when a noise level is negative or non-finite.
pub fn generate(profile: &HouseholdProfile, minutes: u32, seed: u64) -> Result<SyntheticTelemetry, NormalError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let power_noise = Normal::new(0.0, profile.baseload_noise_watts)?;
    let temp_noise = Normal::new(0.0, profile.temperature_noise_f)?;

    let wh = &profile.water_heater;
    if wh.cycle_minutes() > wh.draw_period_minutes {
        tracing::warn!(
            cycle = wh.cycle_minutes(),
            period = wh.draw_period_minutes,
            "water heater cycle longer than draw period; cycles will overlap"
        );
    }

    let capacity = minutes as usize;
    let mut power = Vec::with_capacity(capacity);
    let mut upper_temp = Vec::with_capacity(capacity);
    let mut lower_temp = Vec::with_capacity(capacity);

    let mut upper_f = wh.upper_setpoint_f;
    let mut lower_f = wh.lower_setpoint_f;
    let max_jitter = profile.jitter_ms.min(profile.interval_ms / 3).max(0);

    for minute in 0..minutes {
        let (phase, draw) = heater_phase(wh, minute);

        if draw {
            upper_f -= wh.upper_draw_drop_f;
            lower_f -= wh.lower_draw_drop_f;
        }

        let mut watts = profile.baseload_watts + power_noise.sample(&mut rng);
        if profile.refrigerator.is_on(minute) {
            watts += profile.refrigerator.watts;
        }
        if profile.furnace.is_on(minute) {
            watts += profile.furnace.watts;
        }

        match phase {
            HeaterPhase::Upper => {
                watts += wh.upper_watts;
                upper_f = (upper_f + wh.upper_rate()).min(wh.upper_setpoint_f);
            }
            HeaterPhase::Lower => {
                watts += wh.lower_watts;
                lower_f = (lower_f + wh.lower_rate()).min(wh.lower_setpoint_f);
                // Some heat rises into the upper sensor's layer
                upper_f = (upper_f + wh.lower_rate() * 0.1).min(wh.upper_setpoint_f);
            }
            HeaterPhase::Idle => {
                upper_f -= wh.standby_loss_f_per_min;
                lower_f -= wh.standby_loss_f_per_min;
            }
        }

        let nominal = profile.start_timestamp_ms + i64::from(minute) * profile.interval_ms;
        let jitter = |rng: &mut StdRng| {
            if max_jitter > 0 {
                rng.gen_range(-max_jitter..=max_jitter)
            } else {
                0
            }
        };

        power.push(Sample::new(nominal + jitter(&mut rng), watts.max(0.0)));
        upper_temp.push(Sample::new(
            nominal + jitter(&mut rng),
            upper_f + temp_noise.sample(&mut rng),
        ));
        lower_temp.push(Sample::new(
            nominal + jitter(&mut rng),
            lower_f + temp_noise.sample(&mut rng),
        ));
    }

    tracing::debug!(minutes, seed, samples = power.len(), "synthetic telemetry generated");

    Ok(SyntheticTelemetry {
        power,
        upper_temp,
        lower_temp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_telemetry() {
        let profile = HouseholdProfile::default();
        let a = generate(&profile, 240, 7).unwrap();
        let b = generate(&profile, 240, 7).unwrap();
        let c = generate(&profile, 240, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.power, c.power);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let data = generate(&HouseholdProfile::default(), 600, 1).unwrap();
        for series in [&data.power, &data.upper_temp, &data.lower_temp] {
            assert!(series.windows(2).all(|w| w[1].timestamp_ms > w[0].timestamp_ms));
        }
    }

    #[test]
    fn test_heater_schedule_hands_off() {
        let wh = HouseholdProfile::default().water_heater;
        assert_eq!(heater_phase(&wh, 0), (HeaterPhase::Idle, true));
        assert_eq!(heater_phase(&wh, 4).0, HeaterPhase::Idle);
        assert_eq!(heater_phase(&wh, 5).0, HeaterPhase::Upper);
        assert_eq!(heater_phase(&wh, 19).0, HeaterPhase::Upper);
        assert_eq!(heater_phase(&wh, 20).0, HeaterPhase::Idle);
        assert_eq!(heater_phase(&wh, 22).0, HeaterPhase::Lower);
    }

    #[test]
    fn test_upper_element_power_in_band() {
        let data = generate(&HouseholdProfile::default(), 180, 3).unwrap();
        // minute 10 sits inside the first upper-element run
        let net = data.power[10].value - 1_000.0;
        assert!(net > 4_400.0 && net < 5_300.0, "net {net}");
    }

    #[test]
    fn test_negative_noise_rejected() {
        let profile = HouseholdProfile {
            baseload_noise_watts: -1.0,
            ..HouseholdProfile::default()
        };
        assert!(generate(&profile, 10, 0).is_err());
    }
}
