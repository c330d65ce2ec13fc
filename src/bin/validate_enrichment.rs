// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation: enrichment pipeline — ingest through diurnal labelling.
//!
//! Validates the Rust enrichment chain against hand-computed values from
//! the Python `fish_telemetry_faa` loaders (`pinpoint_data_converter`,
//! `filter_util`, `sun_times`). Checks calibration slopes, timezone
//! correction, quality-filter accounting, z-score exclusion, and the
//! seven-interval diurnal partition.
//!
//! Hardcoded expected values, explicit pass/fail, exit code 0/1.
//!
//! # Provenance
//!
//! | Field | Value |
//! |-------|-------|
//! | Baseline tool | fish_telemetry_faa (Python) |
//! | Baseline modules | pinpoint_data_converter.py, filter_util.py, sun_times.py |
//! | Baseline command | hand-traced on the synthetic batch below |
//! | Data | synthetic 2021-05-26 batch, tag pair 1001/1002 |

use chrono::{NaiveDate, NaiveTime};

use seabream::solar::{SolarDay, SolarEventTable};
use seabream::telemetry::channel::{ACTIVITY_SLOPE, TEMPERATURE_OFFSET, TEMPERATURE_SLOPE};
use seabream::telemetry::pipeline::{enrich, PipelineParams};
use seabream::telemetry::record::{ChannelType, RawDetection, TagIdent, TimeOfDay};
use seabream::tolerances;
use seabream::validation::Validator;

fn hms(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid clock time")
}

fn table() -> SolarEventTable {
    // 2021-05-26 sheet values for the receiver site.
    let days = (26..=31).map(|d| SolarDay {
        date: NaiveDate::from_ymd_opt(2021, 5, d).expect("valid date"),
        sunrise_official: hms(6, 9),
        sunset_official: hms(20, 30),
        sunrise_civil: hms(5, 42),
        sunset_civil: hms(20, 57),
        sunrise_nautical: hms(5, 9),
        sunset_nautical: hms(21, 31),
        sunrise_astronomical: hms(4, 33),
        sunset_astronomical: hms(22, 7),
    });
    SolarEventTable::from_days(days).expect("nested solar day")
}

fn detection(h: u32, m: u32, tag: u32, raw: f64, snr: f64, hdop: Option<f64>) -> RawDetection {
    RawDetection {
        time_utc: NaiveDate::from_ymd_opt(2021, 5, 26)
            .expect("valid date")
            .and_hms_opt(h, m, 0)
            .expect("valid time"),
        tag: TagIdent::Id(tag),
        depth: 4.0,
        raw_channel_value: raw,
        signal_quality: snr,
        geometric_precision: hdop,
    }
}

fn main() {
    let mut v = Validator::new("seabream: enrichment pipeline vs Python baseline");

    v.section("── Calibration constants ──");
    v.check(
        "activity slope (counts → m/s²)",
        ACTIVITY_SLOPE,
        0.013_588,
        tolerances::EXACT,
    );
    v.check(
        "temperature slope",
        TEMPERATURE_SLOPE,
        0.1,
        tolerances::EXACT,
    );
    v.check(
        "temperature offset",
        TEMPERATURE_OFFSET,
        10.0,
        tolerances::EXACT,
    );

    v.section("── Pipeline run (constrained) ──");
    let detections = vec![
        detection(9, 0, 1001, 150.0, 30.0, Some(0.8)), // temperature channel
        detection(9, 5, 1002, 1000.0, 30.0, Some(0.8)), // activity channel
        detection(9, 10, 1001, 150.0, 10.0, Some(0.8)), // SNR below 20
        detection(9, 15, 1001, 150.0, 55.0, Some(0.8)), // SNR at/above 50
        detection(9, 20, 1001, 150.0, 30.0, Some(1.2)), // HDOP at bound, excluded
        detection(9, 25, 1001, 150.0, 30.0, None),      // HDOP missing
    ];
    let (enriched, stats) = match enrich(&detections, &table(), &PipelineParams::constrained()) {
        Ok(out) => out,
        Err(e) => {
            let (passed, total) = v.counts();
            println!("  [FAIL]  pipeline aborted: {e}");
            seabream::validation::exit_with_result(
                "seabream: enrichment pipeline vs Python baseline",
                passed,
                total + 1,
            );
            return;
        }
    };
    v.check_count("ingested records", stats.ingested, 6);
    v.check_count("excluded by SNR", stats.filter.excluded_by_snr, 2);
    v.check_count("excluded by HDOP", stats.filter.excluded_by_hdop, 2);
    v.check_count("enriched records", enriched.len(), 2);

    v.section("── Timezone and channels ──");
    v.check(
        "UTC+3 correction (09:00 UTC → 12:00 local)",
        f64::from(chrono::Timelike::hour(&enriched[0].sensor.timestamp.time())),
        12.0,
        tolerances::EXACT,
    );
    let temp_rec = &enriched[0];
    v.check_count(
        "odd tag id carries temperature",
        usize::from(temp_rec.channel == ChannelType::Temperature),
        1,
    );
    v.check(
        "temperature 150 counts → 25.0 °C",
        temp_rec.temperature,
        0.1_f64.mul_add(150.0, 10.0),
        tolerances::TEMPERATURE_CALIBRATION,
    );
    v.check(
        "non-carried channel sentinel",
        temp_rec.activity,
        -1.0,
        tolerances::EXACT,
    );
    let act_rec = &enriched[1];
    v.check(
        "activity 1000 counts → 13.588",
        act_rec.activity,
        13.588,
        tolerances::ANALYTICAL_F64,
    );

    v.section("── Diurnal labels ──");
    v.check_count(
        "midday record labelled Day",
        usize::from(temp_rec.time_of_day == TimeOfDay::Day),
        1,
    );
    v.check_count(
        "midday record in 12:00-14:00 interval",
        usize::from(format!("{}", temp_rec.interval) == "12:00 to 14:00"),
        1,
    );

    v.finish();
}
