// SPDX-License-Identifier: AGPL-3.0-or-later
//! Depth / time-of-day density clustering.
//!
//! Replaces `fish_depth_clustering` (scikit-learn `DBSCAN` over a
//! precomputed distance matrix).
//!
//! # Algorithm
//!
//! The feature space is (depth in metres, time of day in hours). Time
//! is circular: the difference between two clock times is taken the
//! short way around the 24-hour dial, so 23:30 and 00:30 are one hour
//! apart. Pairwise distances are Euclidean over (depth delta, wrapped
//! hour delta).
//!
//! DBSCAN runs over the precomputed condensed distance matrix with the
//! scikit-learn conventions: the eps-neighbourhood is inclusive
//! (`d <= eps`), a point counts itself towards `min_samples`, noise is
//! labelled `-1`, and clusters are numbered `0, 1, ..` in order of
//! first core-point discovery. Records can optionally be clustered day
//! by day instead of over the pooled stream.
//!
//! O(n^2) distance work; the field datasets top out around 2e4 records
//! per fish so this stays tractable without an index.

use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::telemetry::record::EnrichedRecord;

/// Noise label, as scikit-learn emits it.
pub const NOISE: i32 = -1;

/// Clustering configuration.
#[derive(Debug, Clone)]
pub struct ClusterParams {
    /// Neighbourhood radius (inclusive) in the depth/hours space.
    pub eps: f64,
    /// Minimum neighbourhood size (the point itself included) for a
    /// core point.
    pub min_samples: usize,
    /// Cluster each calendar date separately instead of pooling.
    pub day_by_day: bool,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 300,
            day_by_day: false,
        }
    }
}

impl ClusterParams {
    fn validate(&self) -> Result<()> {
        if self.eps <= 0.0 || !self.eps.is_finite() || self.min_samples == 0 {
            return Err(Error::InvalidInput(format!(
                "eps {} and min_samples {} must both be positive",
                self.eps, self.min_samples
            )));
        }
        Ok(())
    }
}

/// Cluster label for one input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterAssignment {
    /// Index into the input slice.
    pub record_index: usize,
    /// Cluster id, or [`NOISE`].
    pub label: i32,
}

/// Wrapped hour difference: the short way around the 24-hour dial.
#[must_use]
pub fn circular_hour_delta(a: f64, b: f64) -> f64 {
    let mut dt = (a - b).abs();
    if dt > 12.0 {
        dt = 24.0 - dt;
    }
    dt
}

/// Condensed upper-triangle pairwise distances over (depth, hours)
/// points, row-major: entry for `(i, j)` with `i < j` sits at
/// `i * n - i * (i + 1) / 2 + (j - i - 1)`.
#[must_use]
pub fn condensed_distances(points: &[(f64, f64)]) -> Vec<f64> {
    let n = points.len();
    let mut out = Vec::with_capacity(n * (n.saturating_sub(1)) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let dd = points[i].0 - points[j].0;
            let dt = circular_hour_delta(points[i].1, points[j].1);
            out.push(dd.hypot(dt));
        }
    }
    out
}

#[inline]
fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    debug_assert!(i < j && j < n);
    i * n - i * (i + 1) / 2 + (j - i - 1)
}

/// DBSCAN over a precomputed condensed distance matrix.
///
/// Returns one label per point. Deterministic: points are seeded in
/// index order and neighbourhoods expanded breadth-first.
#[must_use]
pub fn dbscan_precomputed(n: usize, condensed: &[f64], eps: f64, min_samples: usize) -> Vec<i32> {
    debug_assert_eq!(condensed.len(), n * n.saturating_sub(1) / 2);

    let neighbours = |p: usize| -> Vec<usize> {
        let mut hood = Vec::new();
        for q in 0..n {
            if q == p {
                hood.push(q); // a point neighbours itself
            } else {
                let (i, j) = if p < q { (p, q) } else { (q, p) };
                if condensed[condensed_index(n, i, j)] <= eps {
                    hood.push(q);
                }
            }
        }
        hood
    };

    const UNVISITED: i32 = -2;
    let mut labels = vec![UNVISITED; n];
    let mut next_cluster = 0;

    for seed in 0..n {
        if labels[seed] != UNVISITED {
            continue;
        }
        let hood = neighbours(seed);
        if hood.len() < min_samples {
            labels[seed] = NOISE;
            continue;
        }
        let cluster = next_cluster;
        next_cluster += 1;
        labels[seed] = cluster;
        let mut queue: VecDeque<usize> = hood.into_iter().collect();
        while let Some(p) = queue.pop_front() {
            if labels[p] == NOISE {
                labels[p] = cluster; // border point reached from a core
            }
            if labels[p] != UNVISITED {
                continue;
            }
            labels[p] = cluster;
            let hood = neighbours(p);
            if hood.len() >= min_samples {
                queue.extend(hood);
            }
        }
    }
    labels
}

fn cluster_group(
    indexed: &[(usize, (f64, f64))],
    params: &ClusterParams,
    cluster_offset: i32,
) -> (Vec<ClusterAssignment>, i32) {
    let points: Vec<(f64, f64)> = indexed.iter().map(|&(_, p)| p).collect();
    let condensed = condensed_distances(&points);
    let labels = dbscan_precomputed(points.len(), &condensed, params.eps, params.min_samples);
    let clusters_found = labels.iter().copied().max().unwrap_or(NOISE) + 1;
    let assignments = indexed
        .iter()
        .zip(&labels)
        .map(|(&(record_index, _), &label)| ClusterAssignment {
            record_index,
            label: if label == NOISE { NOISE } else { label + cluster_offset },
        })
        .collect();
    (assignments, clusters_found)
}

/// Cluster an enriched stream in (depth, time-of-day) space.
///
/// In day-by-day mode each calendar date is clustered independently and
/// cluster ids are offset so they stay unique across dates. Output is
/// ordered by `record_index`.
pub fn cluster(records: &[EnrichedRecord], params: &ClusterParams) -> Result<Vec<ClusterAssignment>> {
    params.validate()?;
    if records.is_empty() {
        return Err(Error::EmptyResult("clustering: no records".into()));
    }

    let mut assignments = if params.day_by_day {
        let mut by_date: BTreeMap<NaiveDate, Vec<(usize, (f64, f64))>> = BTreeMap::new();
        for (idx, rec) in records.iter().enumerate() {
            by_date
                .entry(rec.sensor.timestamp.date())
                .or_default()
                .push((idx, (rec.sensor.depth, rec.time_of_day_hours)));
        }
        let mut offset = 0;
        let mut all = Vec::with_capacity(records.len());
        for group in by_date.values() {
            let (mut part, found) = cluster_group(group, params, offset);
            offset += found;
            all.append(&mut part);
        }
        all
    } else {
        let indexed: Vec<(usize, (f64, f64))> = records
            .iter()
            .enumerate()
            .map(|(idx, rec)| (idx, (rec.sensor.depth, rec.time_of_day_hours)))
            .collect();
        cluster_group(&indexed, params, 0).0
    };
    assignments.sort_by_key(|a| a.record_index);
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::telemetry::record::{
        fractional_hours, ChannelType, DiurnalInterval, SensorRecord, TimeOfDay, WaterColumn,
    };

    fn ts(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 5, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn rec(timestamp: NaiveDateTime, depth: f64) -> EnrichedRecord {
        EnrichedRecord {
            sensor: SensorRecord {
                tag_id: 1001,
                fish_id: 1002,
                timestamp,
                depth,
                raw_channel_value: 150.0,
                signal_quality: 30.0,
                geometric_precision: Some(1.0),
            },
            channel: ChannelType::Temperature,
            activity: -1.0,
            temperature: 25.0,
            time_of_day: TimeOfDay::Day,
            interval: DiurnalInterval::T1200To1400,
            water_column: WaterColumn::from_depth(depth),
            time_of_day_hours: fractional_hours(timestamp),
        }
    }

    #[test]
    fn hour_delta_wraps_around_midnight() {
        // 23:50 vs 00:10 is 20 minutes apart, not 23⅔ hours.
        let h2350 = 23.0 + 50.0 / 60.0;
        let h0010 = 10.0 / 60.0;
        assert!((circular_hour_delta(h2350, h0010) - 1.0 / 3.0).abs() < 1e-12);
        assert!((circular_hour_delta(23.5, 0.5) - 1.0).abs() < 1e-12);
        assert!((circular_hour_delta(0.5, 23.5) - 1.0).abs() < 1e-12);
        assert!((circular_hour_delta(6.0, 18.0) - 12.0).abs() < 1e-12);
        assert!((circular_hour_delta(3.0, 3.0)).abs() < 1e-12);
    }

    #[test]
    fn condensed_layout_matches_index_formula() {
        let points = vec![(0.0, 0.0), (1.0, 0.0), (0.0, 3.0), (2.0, 6.0)];
        let d = condensed_distances(&points);
        assert_eq!(d.len(), 6);
        assert!((d[condensed_index(4, 0, 1)] - 1.0).abs() < 1e-12);
        assert!((d[condensed_index(4, 0, 2)] - 3.0).abs() < 1e-12);
        assert!((d[condensed_index(4, 1, 3)] - 1f64.hypot(6.0)).abs() < 1e-12);
    }

    #[test]
    fn two_blobs_and_noise() {
        // Blob A: 5 points near (2m, 03:00). Blob B: 5 points near
        // (7m, 15:00). One far outlier.
        let mut points = Vec::new();
        for i in 0..5 {
            points.push((2.0 + 0.01 * f64::from(i), 3.0));
        }
        for i in 0..5 {
            points.push((7.0 + 0.01 * f64::from(i), 15.0));
        }
        points.push((4.5, 9.0));
        let condensed = condensed_distances(&points);
        let labels = dbscan_precomputed(points.len(), &condensed, 0.5, 4);
        assert_eq!(&labels[0..5], &[0; 5]);
        assert_eq!(&labels[5..10], &[1; 5]);
        assert_eq!(labels[10], NOISE);
    }

    #[test]
    fn eps_neighbourhood_is_inclusive() {
        // Two points exactly eps apart with min_samples 2 form a cluster.
        let points = vec![(0.0, 0.0), (0.5, 0.0)];
        let condensed = condensed_distances(&points);
        let labels = dbscan_precomputed(2, &condensed, 0.5, 2);
        assert_eq!(labels, vec![0, 0]);
        // Just beyond eps they are both noise.
        let points = vec![(0.0, 0.0), (0.500_001, 0.0)];
        let condensed = condensed_distances(&points);
        let labels = dbscan_precomputed(2, &condensed, 0.5, 2);
        assert_eq!(labels, vec![NOISE, NOISE]);
    }

    #[test]
    fn min_samples_counts_the_point_itself() {
        // Three mutually-close points: each neighbourhood has size 3.
        let points = vec![(0.0, 0.0), (0.1, 0.0), (0.2, 0.0)];
        let condensed = condensed_distances(&points);
        assert_eq!(dbscan_precomputed(3, &condensed, 0.5, 3), vec![0, 0, 0]);
        assert_eq!(
            dbscan_precomputed(3, &condensed, 0.5, 4),
            vec![NOISE, NOISE, NOISE]
        );
    }

    #[test]
    fn midnight_spanning_cluster_stays_together() {
        // Points at 23:45 and 00:15 at the same depth are 0.5h apart and
        // cluster despite straddling midnight.
        let records = vec![
            rec(ts(26, 23, 45), 4.0),
            rec(ts(27, 0, 15), 4.0),
            rec(ts(27, 12, 0), 4.0), // far in time
        ];
        let params = ClusterParams {
            eps: 0.6,
            min_samples: 2,
            day_by_day: false,
        };
        let labels = cluster(&records, &params).unwrap();
        assert_eq!(labels[0].label, labels[1].label);
        assert_ne!(labels[0].label, NOISE);
        assert_eq!(labels[2].label, NOISE);
    }

    #[test]
    fn day_by_day_keeps_cluster_ids_unique() {
        let mut records = Vec::new();
        for day in [26, 27] {
            for m in 0..4 {
                records.push(rec(ts(day, 10, m), 5.0));
            }
        }
        let params = ClusterParams {
            eps: 0.5,
            min_samples: 3,
            day_by_day: true,
        };
        let labels = cluster(&records, &params).unwrap();
        let day_one: Vec<i32> = labels[0..4].iter().map(|a| a.label).collect();
        let day_two: Vec<i32> = labels[4..8].iter().map(|a| a.label).collect();
        assert_eq!(day_one, vec![0; 4]);
        assert_eq!(day_two, vec![1; 4]);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let records = vec![rec(ts(26, 10, 0), 5.0)];
        let bad_eps = ClusterParams {
            eps: 0.0,
            ..ClusterParams::default()
        };
        assert!(matches!(
            cluster(&records, &bad_eps),
            Err(Error::InvalidInput(_))
        ));
        let bad_min = ClusterParams {
            min_samples: 0,
            ..ClusterParams::default()
        };
        assert!(matches!(
            cluster(&records, &bad_min),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            cluster(&[], &ClusterParams::default()),
            Err(Error::EmptyResult(_))
        ));
    }

    #[test]
    fn rerun_is_identical() {
        let records: Vec<EnrichedRecord> = (0..40)
            .map(|i| rec(ts(26, i % 24, (i * 13) % 60), f64::from(i % 9)))
            .collect();
        let params = ClusterParams {
            eps: 1.0,
            min_samples: 4,
            day_by_day: false,
        };
        let a = cluster(&records, &params).unwrap();
        let b = cluster(&records, &params).unwrap();
        assert_eq!(a, b);
    }
}
