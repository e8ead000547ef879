//! Thermal correlation: which sensor warms after a load turns on
//!
//! A tank element heats the water around its own thermostat first. Averaging
//! the temperature change over a fixed window after each of a group's
//! transitions, per sensor, attributes the group to the element it drives.

use crate::types::{LoadGroup, ThermalResponse};

/// Mean of `temps[idx + lookahead] - temps[idx]` over members whose window
/// fits inside the series; 0 when none does.
pub fn thermal_response(members: &[usize], temps: &[f64], lookahead: usize) -> f64 {
    let deltas: Vec<f64> = members
        .iter()
        .filter_map(|&idx| {
            let end = idx.checked_add(lookahead)?;
            Some(temps.get(end)? - temps.get(idx)?)
        })
        .collect();

    if deltas.is_empty() {
        0.0
    } else {
        deltas.iter().sum::<f64>() / deltas.len() as f64
    }
}

/// Responses of every group at or above `min_group_watts` on every sensor.
///
/// Each temperature series must share the power series' grid; the caller
/// trims all series to a common length first.
pub fn correlate_groups(
    groups: &[LoadGroup],
    sensors: &[(String, Vec<f64>)],
    lookahead: usize,
    min_group_watts: f64,
) -> Vec<ThermalResponse> {
    groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.centroid >= min_group_watts)
        .flat_map(|(group, g)| {
            sensors.iter().map(move |(sensor, temps)| ThermalResponse {
                group,
                sensor: sensor.clone(),
                mean_delta: thermal_response(&g.members, temps, lookahead),
            })
        })
        .collect()
}

/// The sensor with the strictly largest mean rise above `floor`.
///
/// Ties for the largest rise attribute nothing.
pub fn attribute_sensor(responses: &[ThermalResponse], floor: f64) -> Option<&ThermalResponse> {
    let best = responses
        .iter()
        .max_by(|a, b| a.mean_delta.total_cmp(&b.mean_delta))?;

    let tied = responses
        .iter()
        .filter(|r| r.mean_delta == best.mean_delta)
        .count()
        > 1;

    (best.mean_delta > floor && !tied).then_some(best)
}
