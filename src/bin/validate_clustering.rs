// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation: depth/time-of-day DBSCAN — scikit-learn conventions.
//!
//! Validates the wraparound time metric, the condensed distance layout,
//! and DBSCAN labelling against hand-computed values from
//! `fish_depth_clustering.dbscan_clustering`.
//!
//! # Provenance
//!
//! | Field | Value |
//! |-------|-------|
//! | Baseline tool | fish_telemetry_faa (Python) |
//! | Baseline modules | dbscan_clustering.py (sklearn.cluster.DBSCAN) |
//! | Baseline command | hand-traced on the synthetic blobs below |
//! | Data | two synthetic depth/time blobs plus one outlier |

use chrono::{NaiveDate, NaiveDateTime};

use seabream::telemetry::cluster::{
    circular_hour_delta, cluster, condensed_distances, dbscan_precomputed, ClusterParams, NOISE,
};
use seabream::telemetry::record::{
    fractional_hours, ChannelType, DiurnalInterval, EnrichedRecord, SensorRecord, TimeOfDay,
    WaterColumn,
};
use seabream::tolerances;
use seabream::validation::Validator;

fn ts(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 5, day)
        .expect("valid date")
        .and_hms_opt(h, m, 0)
        .expect("valid time")
}

fn record(timestamp: NaiveDateTime, depth: f64) -> EnrichedRecord {
    EnrichedRecord {
        sensor: SensorRecord {
            tag_id: 1001,
            fish_id: 1002,
            timestamp,
            depth,
            raw_channel_value: 150.0,
            signal_quality: 30.0,
            geometric_precision: Some(0.8),
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

fn main() {
    let mut v = Validator::new("seabream: DBSCAN clustering vs sklearn conventions");

    v.section("── Wraparound time metric ──");
    v.check(
        "23:00 vs 01:00 is 2 h",
        circular_hour_delta(23.0, 1.0),
        2.0,
        tolerances::ANALYTICAL_F64,
    );
    v.check(
        "06:00 vs 18:00 is 12 h",
        circular_hour_delta(6.0, 18.0),
        12.0,
        tolerances::ANALYTICAL_F64,
    );

    v.section("── Condensed distances ──");
    let points = vec![(0.0, 0.0), (3.0, 4.0), (0.0, 23.0)];
    let d = condensed_distances(&points);
    v.check_count("pair count n(n-1)/2", d.len(), 3);
    v.check("(0,1): hypot(3,4)", d[0], 5.0, tolerances::ANALYTICAL_F64);
    v.check(
        "(0,2): wrapped to 1 h",
        d[1],
        1.0,
        tolerances::ANALYTICAL_F64,
    );

    v.section("── Two blobs and noise ──");
    let mut blob_points = Vec::new();
    for i in 0..5 {
        blob_points.push((2.0 + 0.01 * f64::from(i), 3.0));
    }
    for i in 0..5 {
        blob_points.push((7.0 + 0.01 * f64::from(i), 15.0));
    }
    blob_points.push((4.5, 9.0));
    let condensed = condensed_distances(&blob_points);
    let labels = dbscan_precomputed(blob_points.len(), &condensed, 0.5, 4);
    v.check_count("first blob is cluster 0", usize::from(labels[0..5] == [0; 5]), 1);
    v.check_count("second blob is cluster 1", usize::from(labels[5..10] == [1; 5]), 1);
    v.check_count("outlier is noise", usize::from(labels[10] == NOISE), 1);

    v.section("── Record-level clustering ──");
    let records = vec![
        record(ts(26, 23, 45), 4.0),
        record(ts(27, 0, 15), 4.0),
        record(ts(27, 12, 0), 4.0),
    ];
    let params = ClusterParams {
        eps: 0.6,
        min_samples: 2,
        day_by_day: false,
    };
    match cluster(&records, &params) {
        Ok(assignments) => {
            v.check_count(
                "midnight-spanning pair clusters together",
                usize::from(
                    assignments[0].label == assignments[1].label && assignments[0].label != NOISE,
                ),
                1,
            );
            v.check_count(
                "midday straggler is noise",
                usize::from(assignments[2].label == NOISE),
                1,
            );
            let rerun = cluster(&records, &params).unwrap_or_default();
            v.check_count("rerun is identical", usize::from(assignments == rerun), 1);
        }
        Err(e) => {
            v.check_count(&format!("clustering failed: {e}"), 0, 1);
        }
    }

    v.section("── Day-by-day label spaces ──");
    let mut daily = Vec::new();
    for day in [26, 27] {
        for m in 0..4 {
            daily.push(record(ts(day, 10, m), 5.0));
        }
    }
    let params = ClusterParams {
        eps: 0.5,
        min_samples: 3,
        day_by_day: true,
    };
    match cluster(&daily, &params) {
        Ok(assignments) => {
            let day_one: Vec<i32> = assignments[0..4].iter().map(|a| a.label).collect();
            let day_two: Vec<i32> = assignments[4..8].iter().map(|a| a.label).collect();
            v.check_count("day one labels", usize::from(day_one == vec![0; 4]), 1);
            v.check_count("day two labels offset", usize::from(day_two == vec![1; 4]), 1);
        }
        Err(e) => {
            v.check_count(&format!("day-by-day clustering failed: {e}"), 0, 1);
        }
    }

    v.finish();
}
