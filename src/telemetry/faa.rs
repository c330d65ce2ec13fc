// SPDX-License-Identifier: AGPL-3.0-or-later
//! Food anticipatory activity (FAA) detection over time-binned activity.
//!
//! Replaces `basic_activity_stats.identify_lasting_peaks` /
//! `identify_lasting_peaks_all_dates`.
//!
//! # Algorithm
//!
//! 1. Keep activity-channel records and resample into fixed-width,
//!    left-closed time bins (mean activity per bin; empty bins stay
//!    empty and break runs).
//! 2. Group bins by calendar date; per date the threshold is the
//!    0.5-quantile (linear interpolation) of that date's bin means.
//! 3. Find maximal runs of consecutive bins at or above threshold.
//! 4. Keep runs whose every bin is ≥ threshold (re-verified), whose
//!    length reaches the minimum bin count (120 minutes divided by the
//!    bin width), and — for the within-day variant — which start before
//!    the 08:00 feeding window.
//!
//! The cross-day variant pools all days onto one nominal date before
//! binning (the diel aggregate used by the polar figures), with a finer
//! bin width and no start-time restriction.
//!
//! Detection is deterministic: identical input and configuration yield
//! identical windows.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Error, Result};
use crate::telemetry::record::{ChannelType, EnrichedRecord};

/// FAA detection configuration.
#[derive(Debug, Clone)]
pub struct FaaParams {
    /// Resample bin width in minutes.
    pub bin_minutes: u32,
    /// Quantile of the date's bin means used as threshold.
    pub quantile: f64,
    /// Minimum sustained duration in minutes (the 120-minute feeding
    /// window).
    pub min_duration_minutes: u32,
    /// Within-day variant only: a run must start before this hour.
    pub morning_cutoff_hour: u32,
}

impl FaaParams {
    /// Within-day detection: 20-minute bins, runs must start before the
    /// 08:00–10:00 feeding window.
    #[must_use]
    pub const fn within_day() -> Self {
        Self {
            bin_minutes: 20,
            quantile: 0.5,
            min_duration_minutes: 120,
            morning_cutoff_hour: 8,
        }
    }

    /// Cross-day (pooled) detection: 5-minute bins, no start restriction.
    #[must_use]
    pub const fn cross_day() -> Self {
        Self {
            bin_minutes: 5,
            quantile: 0.5,
            min_duration_minutes: 120,
            morning_cutoff_hour: 24,
        }
    }

    /// Minimum run length in bins.
    #[must_use]
    pub const fn min_bins(&self) -> usize {
        self.min_duration_minutes.div_ceil(self.bin_minutes) as usize
    }

    fn validate(&self) -> Result<()> {
        if self.bin_minutes == 0 || !(0.0..=1.0).contains(&self.quantile) {
            return Err(Error::InvalidInput(format!(
                "bin width {} min / quantile {} out of range",
                self.bin_minutes, self.quantile
            )));
        }
        Ok(())
    }
}

impl Default for FaaParams {
    fn default() -> Self {
        Self::within_day()
    }
}

/// One resample bin: left-closed `[start, start + width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityBin {
    /// Bin start (left label).
    pub start: NaiveDateTime,
    /// Mean of samples in the bin; `None` when the bin is empty.
    pub mean: Option<f64>,
    /// Samples contributing to the mean.
    pub count: usize,
}

/// One detected sustained-activity episode.
#[derive(Debug, Clone, PartialEq)]
pub struct FaaWindow {
    /// Calendar date (nominal pooled date for the cross-day variant).
    pub date: NaiveDate,
    /// Start of the first bin in the run.
    pub start_time: NaiveTime,
    /// Exclusive end: start of the last bin plus the bin width.
    pub end_time: NaiveTime,
    /// Mean of the run's bin means.
    pub mean_activity: f64,
    /// Run length in bins.
    pub bins: usize,
}

/// Resample timestamped samples into contiguous left-closed mean bins.
///
/// Bins are anchored at midnight and span from the bin containing the
/// first sample through the bin containing the last, with empty bins in
/// between kept (as `None`), matching pandas `resample(label='left',
/// closed='left')`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn resample_mean(samples: &[(NaiveDateTime, f64)], bin_minutes: u32) -> Vec<ActivityBin> {
    if samples.is_empty() || bin_minutes == 0 {
        return vec![];
    }
    let mut sorted: Vec<(NaiveDateTime, f64)> = samples.to_vec();
    sorted.sort_by_key(|(t, _)| *t);

    let width = i64::from(bin_minutes) * 60;
    let floor = |t: NaiveDateTime| -> i64 {
        let secs = t.and_utc().timestamp();
        secs.div_euclid(width) * width
    };
    let first = floor(sorted[0].0);
    let last = floor(sorted[sorted.len() - 1].0);

    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (t, v) in &sorted {
        let entry = sums.entry(floor(*t)).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    let mut bins = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        let start = chrono::DateTime::from_timestamp(cursor, 0)
            .expect("bin start within datetime range")
            .naive_utc();
        let (mean, count) = sums
            .get(&cursor)
            .map_or((None, 0), |&(sum, n)| (Some(sum / n as f64), n));
        bins.push(ActivityBin { start, mean, count });
        cursor += width;
    }
    bins
}

/// Linear-interpolation quantile of unsorted values (numpy default).
///
/// Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo].mul_add(1.0 - frac, sorted[hi] * frac))
}

/// Activity-channel samples of an enriched stream.
fn activity_samples(records: &[EnrichedRecord]) -> Vec<(NaiveDateTime, f64)> {
    records
        .iter()
        .filter(|r| r.channel == ChannelType::Activity)
        .map(|r| (r.sensor.timestamp, r.activity))
        .collect()
}

/// Detect windows over pre-binned activity (shared by both variants).
#[allow(clippy::cast_precision_loss)]
fn detect_in_bins(bins: &[ActivityBin], params: &FaaParams) -> Vec<FaaWindow> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ActivityBin>> = BTreeMap::new();
    for bin in bins {
        by_date.entry(bin.start.date()).or_default().push(bin);
    }

    let min_bins = params.min_bins();
    let mut windows = Vec::new();
    for (date, day_bins) in by_date {
        let means: Vec<f64> = day_bins.iter().filter_map(|b| b.mean).collect();
        let Some(threshold) = quantile(&means, params.quantile) else {
            continue; // no populated bins on this date
        };

        let mut run: Vec<&ActivityBin> = Vec::new();
        let flush = |run: &mut Vec<&ActivityBin>, windows: &mut Vec<FaaWindow>| {
            let qualifies = !run.is_empty()
                && run.len() >= min_bins
                && run
                    .iter()
                    .all(|b| b.mean.is_some_and(|m| m >= threshold))
                && run[0].start.time().hour() < params.morning_cutoff_hour;
            if qualifies {
                let run_means: Vec<f64> = run.iter().filter_map(|b| b.mean).collect();
                let last = run[run.len() - 1].start + chrono::Duration::minutes(i64::from(params.bin_minutes));
                windows.push(FaaWindow {
                    date,
                    start_time: run[0].start.time(),
                    end_time: last.time(),
                    mean_activity: run_means.iter().sum::<f64>() / run_means.len() as f64,
                    bins: run.len(),
                });
            }
            run.clear();
        };

        for bin in day_bins {
            if bin.mean.is_some_and(|m| m >= threshold) {
                run.push(bin);
            } else {
                flush(&mut run, &mut windows);
            }
        }
        flush(&mut run, &mut windows);
    }
    windows
}

/// Within-day FAA detection over an enriched stream.
///
/// Returns one [`FaaWindow`] per qualifying run, ordered by date and
/// start time. [`Error::EmptyResult`] if the stream has no activity
/// records at all.
pub fn detect_within_day(records: &[EnrichedRecord], params: &FaaParams) -> Result<Vec<FaaWindow>> {
    params.validate()?;
    let samples = activity_samples(records);
    if samples.is_empty() {
        return Err(Error::EmptyResult(
            "FAA detection: no activity-channel records".into(),
        ));
    }
    let bins = resample_mean(&samples, params.bin_minutes);
    Ok(detect_in_bins(&bins, params))
}

/// Nominal date used when pooling all days for cross-day detection.
/// Arbitrary, outside the field season.
#[must_use]
pub fn pooled_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
}

/// Cross-day FAA detection: pool every record's time of day onto the
/// nominal date, then detect as usual.
pub fn detect_cross_day(records: &[EnrichedRecord], params: &FaaParams) -> Result<Vec<FaaWindow>> {
    params.validate()?;
    let samples: Vec<(NaiveDateTime, f64)> = activity_samples(records)
        .into_iter()
        .map(|(t, v)| (pooled_date().and_time(t.time()), v))
        .collect();
    if samples.is_empty() {
        return Err(Error::EmptyResult(
            "FAA detection: no activity-channel records".into(),
        ));
    }
    let bins = resample_mean(&samples, params.bin_minutes);
    Ok(detect_in_bins(&bins, params))
}
