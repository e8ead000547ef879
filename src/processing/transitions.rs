//! Transition clustering: blind discovery of cyclic loads
//!
//! Every appliance that switches on adds a roughly constant step to the
//! aggregate feed. Clustering the rising steps by magnitude separates the
//! appliances; each cluster then yields an on-duration and a repetition
//! period. A second pass looks for groups that habitually follow each other
//! (e.g. the two elements of a non-simultaneous water heater).

use statrs::statistics::{Data, Median};

use crate::config::ClusteringConfig;
use crate::types::{GroupLink, LoadGroup, Transition};

/// Centroids closer than this are the same centroid.
const CENTROID_EPSILON: f64 = 1e-9;

// ============================================================================
// Transition Detection
// ============================================================================

/// Every sample-to-sample step, indexed by the sample before the step.
pub fn step_deltas(values: &[f64]) -> Vec<Transition> {
    values
        .windows(2)
        .enumerate()
        .map(|(index, w)| Transition {
            index,
            delta: w[1] - w[0],
        })
        .collect()
}

/// Rising steps strictly greater than `min_delta`.
pub fn detect_transitions(values: &[f64], min_delta: f64) -> Vec<Transition> {
    step_deltas(values)
        .into_iter()
        .filter(|t| t.delta > min_delta)
        .collect()
}

// ============================================================================
// Clustering
// ============================================================================

/// 1-D k-means over step magnitudes with a fixed pass count.
///
/// Centroids start evenly spaced between the smallest and largest step.
/// Each pass assigns every step to its nearest centroid (lowest index on a
/// tie) and moves each centroid to the mean of its members; a centroid with
/// no members stays put. The result is sorted ascending with exact
/// duplicates collapsed.
pub fn kmeans_1d(steps: &[f64], k: usize, iterations: usize) -> Vec<f64> {
    if steps.is_empty() || k == 0 {
        return Vec::new();
    }

    let lo = steps.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = steps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut centroids: Vec<f64> = if k == 1 {
        vec![lo]
    } else {
        (0..k)
            .map(|i| lo + (hi - lo) * i as f64 / (k - 1) as f64)
            .collect()
    };

    let mut sums = vec![0.0; k];
    let mut counts = vec![0usize; k];

    for _ in 0..iterations {
        sums.iter_mut().for_each(|s| *s = 0.0);
        counts.iter_mut().for_each(|c| *c = 0);

        for &step in steps {
            let nearest = nearest_centroid(&centroids, step);
            sums[nearest] += step;
            counts[nearest] += 1;
        }

        for (c, (&sum, &count)) in centroids.iter_mut().zip(sums.iter().zip(counts.iter())) {
            if count > 0 {
                *c = sum / count as f64;
            }
        }
    }

    centroids.sort_by(f64::total_cmp);
    centroids.dedup_by(|a, b| (*a - *b).abs() < CENTROID_EPSILON);
    centroids
}

fn nearest_centroid(centroids: &[f64], value: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let dist = (value - c).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

/// Discover load groups from the rising steps of a uniform power series.
///
/// Groups come back in ascending-centroid order. No qualifying step yields
/// an empty list.
pub fn cluster_transitions(values: &[f64], config: &ClusteringConfig) -> Vec<LoadGroup> {
    let rising: Vec<f64> = detect_transitions(values, config.min_delta_watts)
        .iter()
        .map(|t| t.delta)
        .collect();

    if rising.is_empty() {
        tracing::debug!(
            samples = values.len(),
            min_delta = config.min_delta_watts,
            "no significant transitions detected"
        );
        return Vec::new();
    }

    let centroids = kmeans_1d(&rising, config.k, config.iterations);
    let deltas = step_deltas(values);

    let groups: Vec<LoadGroup> = centroids
        .iter()
        .map(|&centroid| build_group(values, &deltas, centroid, config))
        .collect();

    tracing::debug!(
        transitions = rising.len(),
        groups = groups.len(),
        "transition clustering complete"
    );

    groups
}

/// Membership, on-durations and period for one centroid.
///
/// Membership is tested against every step, not only the ones that seeded
/// the clustering.
fn build_group(
    values: &[f64],
    deltas: &[Transition],
    centroid: f64,
    config: &ClusteringConfig,
) -> LoadGroup {
    let tolerance = centroid * config.tolerance_fraction + config.tolerance_floor_watts;

    let members: Vec<usize> = deltas
        .iter()
        .filter(|t| (t.delta - centroid).abs() < tolerance)
        .map(|t| t.index)
        .collect();

    let on_durations = members
        .iter()
        .map(|&idx| on_duration(values, idx, centroid * config.on_level_fraction))
        .collect();

    LoadGroup {
        centroid,
        median_period: median_gap(&members),
        members,
        on_durations,
    }
}

/// Samples after `index` that stay at or above `values[index] + rise`.
pub fn on_duration(values: &[f64], index: usize, rise: f64) -> usize {
    let Some(&base) = values.get(index) else {
        return 0;
    };
    let threshold = base + rise;
    values
        .iter()
        .skip(index + 1)
        .take_while(|&&v| v >= threshold)
        .count()
}

/// Median gap between consecutive indices, 0 with fewer than two.
pub fn median_gap(indices: &[usize]) -> f64 {
    if indices.len() < 2 {
        return 0.0;
    }
    let gaps: Vec<f64> = indices.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    Data::new(gaps).median()
}

// ============================================================================
// Group Linkage
// ============================================================================

/// Pairs of groups where the follower fires within `window` samples after
/// more than `fraction` of the leader's members.
///
/// Each leader member counts at most once however many follower members
/// land in its window.
pub fn link_groups(groups: &[LoadGroup], window: usize, fraction: f64) -> Vec<GroupLink> {
    let mut links = Vec::new();

    for (i, leader) in groups.iter().enumerate() {
        for (j, follower) in groups.iter().enumerate() {
            if i == j {
                continue;
            }

            let followed = leader
                .members
                .iter()
                .filter(|&&li| {
                    follower
                        .members
                        .iter()
                        .any(|&fj| fj > li && fj - li <= window)
                })
                .count();

            if followed as f64 > leader.members.len() as f64 * fraction {
                links.push(GroupLink {
                    leader: i,
                    follower: j,
                    links: followed,
                    leader_count: leader.members.len(),
                    centroid_diff: (leader.centroid - follower.centroid).abs(),
                });
            }
        }
    }

    links
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pulses() -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 0.0, 0.0, 0.0, 100.0, 100.0, 100.0]
    }

    #[test]
    fn test_two_pulses_form_one_group() {
        let groups = cluster_transitions(&two_pulses(), &ClusteringConfig::default());
        assert_eq!(groups.len(), 1, "identical steps collapse to one centroid");

        let g = &groups[0];
        assert!((g.centroid - 100.0).abs() < 1e-9);
        assert_eq!(g.members, vec![2, 8]);
        assert_eq!(g.on_durations, vec![3, 3]);
        assert!((g.median_period - 6.0).abs() < 1e-9);
        assert_eq!(g.duty_cycle(), Some(0.5));
    }

    #[test]
    fn test_no_qualifying_transition_gives_empty() {
        let config = ClusteringConfig::default();
        assert!(cluster_transitions(&[], &config).is_empty());
        assert!(cluster_transitions(&[7.0], &config).is_empty());
        assert!(cluster_transitions(&[0.0, 20.0, 40.0, 10.0], &config).is_empty());
        // Falling steps never qualify
        assert!(cluster_transitions(&[500.0, 0.0, -100.0], &config).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let transitions = detect_transitions(&[0.0, 50.0, 100.0, 151.0], 50.0);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].index, 2);
    }

    #[test]
    fn test_distinct_loads_separate() {
        // Fridge (~150 W) every 10 samples, heater element (~4500 W) every 25
        let mut values = vec![200.0; 200];
        for start in (5..200).step_by(10) {
            for v in values.iter_mut().skip(start).take(4) {
                *v += 150.0;
            }
        }
        for start in (12..200).step_by(25) {
            for v in values.iter_mut().skip(start).take(6) {
                *v += 4500.0;
            }
        }

        let config = ClusteringConfig {
            k: 2,
            ..ClusteringConfig::default()
        };
        let groups = cluster_transitions(&values, &config);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].centroid < groups[1].centroid);
        assert!((groups[1].centroid - 4500.0).abs() < 200.0);
        assert!((groups[1].median_period - 25.0).abs() < 1e-9);
        assert!(groups[1].on_durations.iter().all(|&d| d == 6));
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let values: Vec<f64> = (0..500)
            .map(|i| match i % 37 {
                0..=4 => 900.0 + (i % 7) as f64 * 3.0,
                10..=13 => 300.0,
                _ => 100.0 + (i % 3) as f64,
            })
            .collect();
        let config = ClusteringConfig::default();
        assert_eq!(
            cluster_transitions(&values, &config),
            cluster_transitions(&values, &config)
        );
    }

    #[test]
    fn test_single_cluster_starts_at_minimum() {
        let centroids = kmeans_1d(&[60.0, 80.0, 100.0], 1, 20);
        assert_eq!(centroids.len(), 1);
        assert!((centroids[0] - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_equidistant_step_joins_lower_centroid() {
        // 5.0 sits midway between the initial centroids 0 and 10
        let centroids = kmeans_1d(&[0.0, 5.0, 10.0], 2, 1);
        assert_eq!(centroids, vec![2.5, 10.0]);
    }

    #[test]
    fn test_on_duration_stops_at_drop() {
        let values = [10.0, 110.0, 110.0, 40.0, 110.0];
        assert_eq!(on_duration(&values, 0, 50.0), 2);
        assert_eq!(on_duration(&values, 4, 50.0), 0);
        assert_eq!(on_duration(&values, 99, 50.0), 0);
    }

    #[test]
    fn test_median_gap_even_count() {
        assert_eq!(median_gap(&[0]), 0.0);
        // gaps 2, 4, 6, 10 -> (4 + 6) / 2
        assert!((median_gap(&[0, 2, 6, 12, 22]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_link_groups_reports_follower() {
        let upper = LoadGroup {
            centroid: 4500.0,
            members: vec![10, 100, 200, 300],
            on_durations: vec![5; 4],
            median_period: 100.0,
        };
        let lower = LoadGroup {
            centroid: 3800.0,
            members: vec![30, 130, 500],
            on_durations: vec![20; 3],
            median_period: 235.0,
        };
        let links = link_groups(&[lower, upper], 60, 0.3);

        // upper (index 1) is followed by lower in 2/4 cases
        let link = links
            .iter()
            .find(|l| l.leader == 1 && l.follower == 0)
            .expect("upper -> lower link");
        assert_eq!(link.links, 2);
        assert_eq!(link.leader_count, 4);
        assert!((link.centroid_diff - 700.0).abs() < 1e-9);

        // lower -> upper: 30->100? 70 > 60; 130->200? 70 > 60; no link
        assert!(!links.iter().any(|l| l.leader == 0));
    }
}
