// SPDX-License-Identifier: AGPL-3.0-or-later
//! Outlier exclusion: per-group z-score screening plus the global hard
//! depth bound.
//!
//! Mirrors `pinpoint_data_converter.exclude_all_outliers`: for each
//! exclusion group (fish identity for the constrained dataset, calendar
//! date for the unconstrained one) the temperature channel is screened
//! with a population z-score (divisor N, not N−1); rows with |z| ≥ 3 are
//! dropped. Depth is then hard-bounded to `[0, 9]` m globally, regardless
//! of z-score. Exclusion counts are reported per criterion.
//!
//! Zero-variance groups produce an undefined ratio upstream; here the
//! policy is explicit: z = 0, the row is never excluded.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::telemetry::record::{ChannelRecord, ChannelType};

/// How records are grouped for the z-score pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionGrouping {
    /// Group by fish identifier (constrained dataset).
    ByFish,
    /// Group by calendar date (unconstrained dataset).
    ByDate,
}

/// Outlier exclusion configuration.
#[derive(Debug, Clone)]
pub struct OutlierParams {
    /// |z| at or above which a row is excluded.
    pub z_max: f64,
    /// Inclusive hard depth bounds in meters.
    pub depth_bounds: (f64, f64),
    /// Exclusion group key.
    pub grouping: ExclusionGrouping,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            z_max: 3.0,
            depth_bounds: (0.0, 9.0),
            grouping: ExclusionGrouping::ByFish,
        }
    }
}

/// Removal counts for one exclusion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionStats {
    /// Records entering the pass.
    pub input_records: usize,
    /// Removed by the temperature z-score screen.
    pub temperature_excluded: usize,
    /// Removed by the hard depth bound.
    pub depth_excluded: usize,
    /// Records surviving.
    pub output_records: usize,
}

/// Arithmetic mean; 0.0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor N).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Fish(u32),
    Date(NaiveDate),
}

fn group_key(record: &ChannelRecord, grouping: ExclusionGrouping) -> GroupKey {
    match grouping {
        ExclusionGrouping::ByFish => GroupKey::Fish(record.sensor.fish_id),
        ExclusionGrouping::ByDate => GroupKey::Date(record.sensor.timestamp.date()),
    }
}

/// Apply the per-group temperature z-score screen, then the global depth
/// bound.
#[must_use]
pub fn exclude(records: Vec<ChannelRecord>, params: &OutlierParams) -> (Vec<ChannelRecord>, ExclusionStats) {
    let mut stats = ExclusionStats {
        input_records: records.len(),
        ..ExclusionStats::default()
    };

    // Group the temperature-channel values; other channels pass through.
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for rec in records.iter().filter(|r| r.channel == ChannelType::Temperature) {
        groups
            .entry(group_key(rec, params.grouping))
            .or_default()
            .push(rec.temperature);
    }
    let moments: BTreeMap<GroupKey, (f64, f64)> = groups
        .into_iter()
        .map(|(key, values)| (key, (mean(&values), population_std(&values))))
        .collect();

    let z_of = |rec: &ChannelRecord| -> f64 {
        if rec.channel != ChannelType::Temperature {
            return 0.0;
        }
        let (m, sd) = moments[&group_key(rec, params.grouping)];
        if sd == 0.0 {
            // Zero-variance group: never an outlier.
            0.0
        } else {
            (rec.temperature - m) / sd
        }
    };

    let after_z: Vec<ChannelRecord> = records
        .into_iter()
        .filter(|rec| z_of(rec).abs() < params.z_max)
        .collect();
    stats.temperature_excluded = stats.input_records - after_z.len();

    let (lo, hi) = params.depth_bounds;
    let after_depth: Vec<ChannelRecord> = after_z
        .into_iter()
        .filter(|rec| rec.sensor.depth >= lo && rec.sensor.depth <= hi)
        .collect();
    stats.depth_excluded =
        stats.input_records - stats.temperature_excluded - after_depth.len();
    stats.output_records = after_depth.len();

    (after_depth, stats)
}
