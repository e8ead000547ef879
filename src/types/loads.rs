//! Load inference types: transitions, load groups, periodicity candidates
//! and thermal responses.

use serde::{Deserialize, Serialize};

/// A step change between two consecutive values of a uniform series.
///
/// `index` is the last sample before the step, so
/// `delta == values[index + 1] - values[index]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub index: usize,
    pub delta: f64,
}

/// A cluster of similar turn-on steps, interpreted as one appliance signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadGroup {
    /// Converged mean step magnitude (W)
    pub centroid: f64,
    /// Transition indices whose step lies within tolerance of the centroid
    pub members: Vec<usize>,
    /// On-duration (samples) for each member, same order as `members`
    pub on_durations: Vec<usize>,
    /// Median gap between consecutive members (samples); 0 with fewer than two members
    pub median_period: f64,
}

impl LoadGroup {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Mean on-duration in samples, 0 for an empty group.
    pub fn mean_on_duration(&self) -> f64 {
        if self.on_durations.is_empty() {
            return 0.0;
        }
        self.on_durations.iter().sum::<usize>() as f64 / self.on_durations.len() as f64
    }

    /// Fraction of time the load is on: mean on-duration over median period.
    ///
    /// `None` when the group has no measurable period.
    pub fn duty_cycle(&self) -> Option<f64> {
        if self.median_period <= 0.0 {
            return None;
        }
        Some((self.mean_on_duration() / self.median_period).min(1.0))
    }
}

/// Hypothesised coupling: members of `follower` regularly follow `leader`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLink {
    /// Index of the leading group (ascending-centroid order)
    pub leader: usize,
    /// Index of the following group
    pub follower: usize,
    /// Leader members followed by a follower member within the window
    pub links: usize,
    /// Total leader members
    pub leader_count: usize,
    /// Absolute centroid difference between the two groups (W)
    pub centroid_diff: f64,
}

/// A detected periodicity: period in minutes plus a comparison-only strength.
///
/// Strength is an FFT magnitude or an autocorrelation coefficient depending
/// on the analyzer that produced it; it is not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicityCandidate {
    pub period_minutes: f64,
    pub strength: f64,
}

/// Mean temperature change on one sensor following a load group's transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalResponse {
    /// Index of the load group
    pub group: usize,
    /// Sensor label (e.g. "upper", "lower")
    pub sensor: String,
    /// Mean delta over the lookahead window
    pub mean_delta: f64,
}
