// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation: FAA detection — within-day and cross-day variants.
//!
//! Validates resampling, the per-date median threshold, run detection,
//! and the morning-window restriction against hand-computed values from
//! `basic_activity_stats.identify_lasting_peaks`.
//!
//! # Provenance
//!
//! | Field | Value |
//! |-------|-------|
//! | Baseline tool | fish_telemetry_faa (Python) |
//! | Baseline modules | basic_activity_stats.py |
//! | Baseline command | hand-traced on the synthetic plateau below |
//! | Data | synthetic plateau day, 20-min bins, median threshold |

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use seabream::telemetry::faa::{
    detect_cross_day, detect_within_day, pooled_date, quantile, resample_mean, FaaParams,
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

fn activity_record(timestamp: NaiveDateTime, activity: f64) -> EnrichedRecord {
    EnrichedRecord {
        sensor: SensorRecord {
            tag_id: 1002,
            fish_id: 1002,
            timestamp,
            depth: 3.0,
            raw_channel_value: activity / seabream::telemetry::channel::ACTIVITY_SLOPE,
            signal_quality: 30.0,
            geometric_precision: Some(0.8),
        },
        channel: ChannelType::Activity,
        activity,
        temperature: -1.0,
        time_of_day: TimeOfDay::Day,
        interval: DiurnalInterval::T1200To1400,
        water_column: WaterColumn::Mid36,
        time_of_day_hours: fractional_hours(timestamp),
    }
}

/// One synthetic day: alternating 0.9/1.1 baseline per 20-min bin with a
/// 3.0 plateau over bins 19..26 (06:20-08:40 exclusive).
fn plateau_day(day: u32) -> Vec<EnrichedRecord> {
    (0..72)
        .map(|bin| {
            let minutes = bin * 20;
            let value = if (19..26).contains(&bin) {
                3.0
            } else if bin % 2 == 0 {
                0.9
            } else {
                1.1
            };
            activity_record(ts(day, minutes / 60, minutes % 60), value)
        })
        .collect()
}

fn main() {
    let mut v = Validator::new("seabream: FAA detection vs Python baseline");

    v.section("── Quantile (numpy linear interpolation) ──");
    v.check(
        "median of {1,2,3,4}",
        quantile(&[1.0, 2.0, 3.0, 4.0], 0.5).unwrap_or(f64::NAN),
        2.5,
        tolerances::ANALYTICAL_F64,
    );
    v.check(
        "0.25-quantile of {1,2,3,4}",
        quantile(&[4.0, 1.0, 3.0, 2.0], 0.25).unwrap_or(f64::NAN),
        1.75,
        tolerances::ANALYTICAL_F64,
    );

    v.section("── Resampling (left-closed, left-labelled) ──");
    let samples = vec![
        (ts(26, 6, 0), 1.0),
        (ts(26, 6, 10), 3.0),
        (ts(26, 6, 20), 5.0),
    ];
    let bins = resample_mean(&samples, 20);
    v.check_count("bin count", bins.len(), 2);
    v.check("first bin mean", bins[0].mean.unwrap_or(f64::NAN), 2.0, tolerances::EXACT);
    v.check_count(
        "first bin labelled at 06:00",
        usize::from(bins[0].start == ts(26, 6, 0)),
        1,
    );

    v.section("── Within-day detection ──");
    let params = FaaParams::within_day();
    v.check_count("minimum run length (120 min / 20 min)", params.min_bins(), 6);
    let records = plateau_day(26);
    match detect_within_day(&records, &params) {
        Ok(windows) => {
            v.check_count("windows detected", windows.len(), 1);
            if let Some(w) = windows.first() {
                v.check_count(
                    "window starts 06:20",
                    usize::from(w.start_time == NaiveTime::from_hms_opt(6, 20, 0).expect("time")),
                    1,
                );
                v.check_count("window length in bins", w.bins, 7);
                v.check("window mean activity", w.mean_activity, 3.0, tolerances::ANALYTICAL_F64);
            }
        }
        Err(e) => {
            v.check_count(&format!("within-day detection failed: {e}"), 0, 1);
        }
    }

    v.section("── Morning restriction ──");
    // Shift the plateau to 09:00: same shape, no longer anticipatory.
    let late: Vec<EnrichedRecord> = (0..72)
        .map(|bin| {
            let minutes = bin * 20;
            let value = if (27..34).contains(&bin) {
                3.0
            } else if bin % 2 == 0 {
                0.9
            } else {
                1.1
            };
            activity_record(ts(26, minutes / 60, minutes % 60), value)
        })
        .collect();
    let late_windows = detect_within_day(&late, &params).unwrap_or_default();
    v.check_count("09:00 plateau rejected", late_windows.len(), 0);

    v.section("── Cross-day pooling ──");
    // 5-minute samples on three days, alternating 0.6/0.4 baseline, 3.0
    // plateau over steps 76..100 (06:20-08:20). The 0.6 bin at 08:20
    // rides along, giving one 25-bin window on the nominal date.
    let mut pooled: Vec<EnrichedRecord> = Vec::new();
    for day in 26..=28 {
        for step in 0..288u32 {
            let minutes = step * 5;
            let value = if (76..100).contains(&step) {
                3.0
            } else if step % 2 == 0 {
                0.6
            } else {
                0.4
            };
            pooled.push(activity_record(ts(day, minutes / 60, minutes % 60), value));
        }
    }
    match detect_cross_day(&pooled, &FaaParams::cross_day()) {
        Ok(windows) => {
            let all_nominal = windows.iter().all(|w| w.date == pooled_date());
            v.check_count("all windows on the nominal date", usize::from(all_nominal), 1);
            v.check_count("pooled plateau detected", windows.len(), 1);
            if let Some(w) = windows.first() {
                v.check_count(
                    "pooled window starts 06:20",
                    usize::from(w.start_time == NaiveTime::from_hms_opt(6, 20, 0).expect("time")),
                    1,
                );
                v.check_count("pooled window length in bins", w.bins, 25);
            }
        }
        Err(e) => {
            v.check_count(&format!("cross-day detection failed: {e}"), 0, 1);
        }
    }

    v.section("── Determinism ──");
    let a = detect_within_day(&records, &params).unwrap_or_default();
    let b = detect_within_day(&records, &params).unwrap_or_default();
    v.check_count("rerun produces identical windows", usize::from(a == b), 1);

    v.finish();
}
