// SPDX-License-Identifier: AGPL-3.0-or-later
//! Quality filtering: signal-quality bounds, geometric-precision bounds,
//! and experiment date windowing.
//!
//! Mirrors `filter_util.py`: both bound pairs are half-open
//! `[lower, upper)`; the date window keeps `[start 00:00, end + 1 day)`,
//! i.e. the end date is inclusive. Counts removed per criterion are
//! reported in [`FilterStats`] — diagnostic only, never control flow.

use chrono::NaiveDate;

use crate::telemetry::record::SensorRecord;

/// Quality filter configuration.
#[derive(Debug, Clone)]
pub struct FilterParams {
    /// SNR bounds in dB, `[lower, upper)`.
    pub snr_bounds: (f64, f64),
    /// HDOP bounds, `[lower, upper)`; `None` for datasets without
    /// positioning (no HDOP filter is applied).
    pub hdop_bounds: Option<(f64, f64)>,
    /// Inclusive experiment date window `(start, end)`; `None` keeps all.
    pub date_window: Option<(NaiveDate, NaiveDate)>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            snr_bounds: (20.0, 50.0),
            hdop_bounds: Some((0.0, 1.2)),
            date_window: Some((
                NaiveDate::from_ymd_opt(2021, 5, 26).expect("valid date"),
                NaiveDate::from_ymd_opt(2021, 6, 6).expect("valid date"),
            )),
        }
    }
}

/// Per-criterion removal counts for one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Records entering the filter.
    pub input_records: usize,
    /// Removed by the date window.
    pub excluded_by_window: usize,
    /// Removed by the SNR bounds.
    pub excluded_by_snr: usize,
    /// Removed by the HDOP bounds (includes records missing HDOP when
    /// bounds are configured).
    pub excluded_by_hdop: usize,
    /// Records surviving all criteria.
    pub output_records: usize,
}

/// Apply date window, SNR, and HDOP bounds in that order.
#[must_use]
pub fn apply(records: Vec<SensorRecord>, params: &FilterParams) -> (Vec<SensorRecord>, FilterStats) {
    let mut stats = FilterStats {
        input_records: records.len(),
        ..FilterStats::default()
    };

    let windowed: Vec<SensorRecord> = match params.date_window {
        Some((start, end)) => records
            .into_iter()
            .filter(|r| {
                let d = r.timestamp.date();
                d >= start && d <= end
            })
            .collect(),
        None => records,
    };
    stats.excluded_by_window = stats.input_records - windowed.len();

    let (lo_snr, hi_snr) = params.snr_bounds;
    let after_snr: Vec<SensorRecord> = windowed
        .into_iter()
        .filter(|r| r.signal_quality >= lo_snr && r.signal_quality < hi_snr)
        .collect();
    stats.excluded_by_snr =
        stats.input_records - stats.excluded_by_window - after_snr.len();

    let after_hdop: Vec<SensorRecord> = match params.hdop_bounds {
        Some((lo, hi)) => after_snr
            .into_iter()
            .filter(|r| r.geometric_precision.is_some_and(|h| h >= lo && h < hi))
            .collect(),
        None => after_snr,
    };
    stats.excluded_by_hdop = stats.input_records
        - stats.excluded_by_window
        - stats.excluded_by_snr
        - after_hdop.len();

    stats.output_records = after_hdop.len();
    (after_hdop, stats)
}
